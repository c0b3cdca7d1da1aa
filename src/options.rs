//! Parsing Options.
//! `pear <RECORDS> -r <PLACE>...`, flags override the config file.

use clap::{Arg, ArgAction, Command};
use std::error::Error;
use std::path::PathBuf;

use crate::config::{PearConfig, ReportFormat};

fn make_options_parser() -> clap::Command {
    Command::new("pear")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Cascading failure simulation over a dependency Petri net")
        .arg(
            Arg::new("records")
                .value_name("RECORDS")
                .help("Record table (.csv, .json or .ron)")
                .required(true),
        )
        .arg(
            Arg::new("remove")
                .short('r')
                .long("remove")
                .value_name("PLACE")
                .help("Place to remove; repeat or separate with commas")
                .action(ArgAction::Append)
                .value_delimiter(','),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value("pear.toml"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path to file where the cascade report will be stored"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Report format")
                .value_parser(["json", "ron"]),
        )
        .arg(
            Arg::new("dot-dir")
                .long("dot-dir")
                .value_name("DIR")
                .help("Directory for the intact and damaged DOT drawings"),
        )
}

#[derive(Debug, Default)]
pub struct Options {
    pub records: PathBuf,
    pub remove: Vec<String>,
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub dot_dir: Option<PathBuf>,
}

impl Options {
    pub fn parse_from_args(flags: &[String]) -> Result<Self, Box<dyn Error>> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let records = matches
            .get_one::<String>("records")
            .map(PathBuf::from)
            .ok_or("missing record file")?;
        let remove = matches
            .get_many::<String>("remove")
            .map(|values| {
                values
                    .filter(|value| !value.is_empty())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let config = matches
            .get_one::<String>("config")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("pear.toml"));
        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("json") => Some(ReportFormat::Json),
            Some("ron") => Some(ReportFormat::Ron),
            Some(_) => return Err("UnsupportedReportFormat".into()),
            None => None,
        };

        Ok(Options {
            records,
            remove,
            config,
            output: matches.get_one::<String>("output").map(PathBuf::from),
            format,
            dot_dir: matches.get_one::<String>("dot-dir").map(PathBuf::from),
        })
    }

    /// Folds command-line overrides into `config`.
    pub fn apply(&self, config: &mut PearConfig) {
        if let Some(format) = self.format {
            config.report_format = format;
        }
        if let Some(dir) = &self.dot_dir {
            config.dot_dir = dir.clone();
        }
    }

    /// Report path: explicit `--output`, else `cascade_report.<ext>`.
    pub fn report_path(&self, config: &PearConfig) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "cascade_report.{}",
                config.report_format.extension()
            ))
        })
    }
}
