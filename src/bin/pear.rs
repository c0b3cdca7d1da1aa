use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use log::debug;

use pear::config::{PearConfig, ReportFormat};
use pear::net::io;
use pear::options::Options;
use pear::{build, cascade_remove, loader};

fn main() {
    if std::env::var("PEAR_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PEAR_LOG")
            .write_style("PEAR_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    if let Err(err) = run() {
        eprintln!("pear: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let options = match Options::parse_from_args(&args) {
        Ok(options) => options,
        Err(err) => match err.downcast::<clap::Error>() {
            Ok(clap_err) => clap_err.exit(),
            Err(err) => return Err(anyhow!("{err}")),
        },
    };
    debug!("pear options: {:?}", options);

    let mut config = PearConfig::load_from_file(&options.config)?;
    options.apply(&mut config);
    debug!("pear config: {:?}", config);

    let records = loader::load_records(&options.records, &config.null_marker)
        .with_context(|| format!("Failed to load records from {:?}", options.records))?;
    let mut net = build(&records).context("Failed to build the dependency net")?;

    let intact = config.intact_dot_path();
    net.write_dot(&intact)
        .with_context(|| format!("Failed to write {:?}", intact))?;

    let all_places = net
        .live_places()
        .map(|place| net.place_name(place).to_string())
        .sorted()
        .collect::<Vec<_>>();
    println!("\nAll starting places: {}", all_places.join(", "));
    println!("\nRemove places: {}", options.remove.join(", "));

    let report = cascade_remove(&mut net, &options.remove);

    println!("\nDeleted places: {}", report.removed.iter().join(", "));
    if !report.skipped.is_empty() {
        println!("\nSkipped places: {}", report.skipped.join(", "));
    }
    if report.is_total_collapse() {
        println!("\nRemaining places: ALL PLACES WERE DELETED");
    } else {
        println!("\nRemaining places: {}", report.remaining.iter().join(", "));
    }

    let damaged = config.damaged_dot_path();
    net.write_dot(&damaged)
        .with_context(|| format!("Failed to write {:?}", damaged))?;

    let report_path = options.report_path(&config);
    match config.report_format {
        ReportFormat::Json => io::write_json(&report_path, &report),
        ReportFormat::Ron => io::write_ron(&report_path, &report),
    }
    .with_context(|| format!("Failed to write report {:?}", report_path))?;
    debug!("report written to {:?}", report_path);

    Ok(())
}
