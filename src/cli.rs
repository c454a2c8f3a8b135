use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// State machine source file
    pub source: PathBuf,

    /// Where to write the generated C++ (default: source with a .cpp extension)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write the validated model as JSON
    #[arg(long, value_name = "PATH")]
    pub emit_model: Option<PathBuf>,

    /// Run the machine with the built-in interpreter after compiling
    #[arg(long)]
    pub run: bool,

    /// `-v` / `-q` to raise or lower logging
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

impl Cli {
    /// Path of the generated C++ file.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.source.with_extension(crate::writer::cpp::EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_replaces_extension() {
        let test_cases = vec![
            (vec!["fsmc", "machines/door.fsm"], "machines/door.cpp"),
            (vec!["fsmc", "noext"], "noext.cpp"),
            (vec!["fsmc", "a.fsm", "-o", "build/out.cc"], "build/out.cc"),
        ];
        for (args, expected) in test_cases {
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.output_path(), PathBuf::from(expected));
        }
    }

    #[test]
    fn test_source_is_required() {
        assert!(Cli::try_parse_from(["fsmc"]).is_err());
    }
}
