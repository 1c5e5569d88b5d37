// exif-footer/src/cli.rs
use crate::core::{FooterConfig, FooterStyle, ResizeAlgorithm};
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "exif-footer",
    version,
    about = "Stamp camera EXIF details and a brand watermark footer below a photo",
    arg_required_else_help = true,
    group(ArgGroup::new("mode").args(["print_exif", "specific_exif", "specific_footer"]))
)]
pub struct Cli {
    /// Photo to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the result (default: <input>_with_exif.<ext>)
    #[arg(value_name = "OUTPUT", conflicts_with_all = ["print_exif", "specific_exif"])]
    pub output: Option<PathBuf>,

    /// Print all EXIF metadata and exit
    #[arg(long)]
    pub print_exif: bool,

    /// Print the camera/exposure fields used in footers and exit
    #[arg(long)]
    pub specific_exif: bool,

    /// Use the brand-specific footer layout
    #[arg(long)]
    pub specific_footer: bool,

    /// Watermark image placed under the photo
    #[arg(long, value_name = "FILE")]
    pub footer_image: Option<PathBuf>,

    /// Font used for the footer text
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = 85, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Filter used to scale the watermark
    #[arg(long, value_enum, default_value_t = Algorithm::Bicubic)]
    pub filter: Algorithm,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Nearest => ResizeAlgorithm::Nearest,
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    PrintExif,
    SpecificExif,
    Footer(FooterStyle),
}

impl Cli {
    pub fn command(&self) -> Commands {
        if self.print_exif {
            Commands::PrintExif
        } else if self.specific_exif {
            Commands::SpecificExif
        } else if self.specific_footer {
            Commands::Footer(FooterStyle::BrandSpecific)
        } else {
            Commands::Footer(FooterStyle::Standard)
        }
    }

    pub fn output_suffix(&self) -> &'static str {
        match self.command() {
            Commands::Footer(FooterStyle::BrandSpecific) => "with_specific_exif",
            _ => "with_exif",
        }
    }

    pub fn footer_config(&self, style: FooterStyle) -> FooterConfig {
        let defaults = FooterConfig::default();
        FooterConfig {
            style,
            footer_image: self.footer_image.clone().unwrap_or(defaults.footer_image),
            font_path: self.font.clone().unwrap_or(defaults.font_path),
            quality: self.quality,
            algorithm: self.filter.into(),
            reference_width: defaults.reference_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn plain_input_runs_standard_footer() {
        let cli = Cli::try_parse_from(["exif-footer", "photo.jpg"]).unwrap();
        assert_eq!(cli.command(), Commands::Footer(FooterStyle::Standard));
        assert_eq!(cli.output_suffix(), "with_exif");
        assert!(cli.output.is_none());
    }

    #[test]
    fn mode_flags_select_commands() {
        let cli = Cli::try_parse_from(["exif-footer", "--print-exif", "photo.jpg"]).unwrap();
        assert_eq!(cli.command(), Commands::PrintExif);

        let cli = Cli::try_parse_from(["exif-footer", "--specific-exif", "photo.jpg"]).unwrap();
        assert_eq!(cli.command(), Commands::SpecificExif);

        let cli =
            Cli::try_parse_from(["exif-footer", "--specific-footer", "photo.jpg", "out.jpg"]).unwrap();
        assert_eq!(cli.command(), Commands::Footer(FooterStyle::BrandSpecific));
        assert_eq!(cli.output_suffix(), "with_specific_exif");
        assert_eq!(cli.output, Some(PathBuf::from("out.jpg")));
    }

    #[test]
    fn modes_are_mutually_exclusive() {
        let err = Cli::try_parse_from(["exif-footer", "--print-exif", "--specific-footer", "a.jpg"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn listing_modes_reject_an_output_path() {
        let err = Cli::try_parse_from(["exif-footer", "--specific-exif", "photo.jpg", "extra.jpg"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let err = Cli::try_parse_from(["exif-footer", "--print-exif", "photo.jpg", "extra.jpg"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn no_arguments_shows_help() {
        let err = Cli::try_parse_from(["exif-footer"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "exif-footer",
            "--font",
            "my.ttf",
            "--footer-image",
            "band.png",
            "-q",
            "70",
            "--filter",
            "lanczos3",
            "photo.jpg",
        ])
        .unwrap();
        let config = cli.footer_config(FooterStyle::Standard);
        assert_eq!(config.font_path, PathBuf::from("my.ttf"));
        assert_eq!(config.footer_image, PathBuf::from("band.png"));
        assert_eq!(config.quality, 70);
        assert_eq!(config.algorithm, ResizeAlgorithm::Lanczos3);
    }

    #[test]
    fn quality_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["exif-footer", "-q", "0", "photo.jpg"]).is_err());
    }
}
