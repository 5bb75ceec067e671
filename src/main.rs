// Entry point and high-level CLI flow.
//
// Loads one snapshot, builds the dashboard over it, renders the requested
// table (or the three-year comparison) to the console and optionally
// exports CSVs and a JSON summary.
use anyhow::Context;
use clap::Parser;
use log::info;
use underwriting_report::config::Cli;
use underwriting_report::output::{display_rows, preview_view, write_csv, write_json};
use underwriting_report::reports::{summarize, ReportView};
use underwriting_report::util::format_int;
use underwriting_report::{loader, Dashboard};

fn export(
    out_dir: &std::path::Path,
    views: &[ReportView],
    dashboard: &Dashboard,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    for view in views {
        let file = if views.len() == 1 {
            "segment_report.csv".to_string()
        } else {
            format!("segment_report_{}.csv", view.year)
        };
        write_csv(out_dir.join(&file), &display_rows(view))?;
        println!("(Full table exported to {})", out_dir.join(&file).display());
    }
    write_json(out_dir.join("summary.json"), &summarize(dashboard.load_report(), views))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let raw = loader::load_path(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    let dashboard = Dashboard::new(&raw);
    let report = dashboard.load_report();
    println!(
        "Processing dataset... ({} records loaded, {} without a financial period)\n",
        format_int(report.total_rows),
        format_int(report.unclassified_periods)
    );

    let params = cli.query()?;
    info!("Reporting {} with {:?}", params.year, params);

    let views = if cli.multi_year {
        let view = dashboard.multi_year(&params);
        for year in &view.years {
            preview_view(&format!("Segment Summary {}", year.year), year, cli.preview);
        }
        view.years
    } else {
        let view = dashboard.single_year(&params);
        preview_view(&format!("Segment Summary {}", view.year), &view, cli.preview);
        vec![view]
    };

    if let Some(out_dir) = &cli.out_dir {
        export(out_dir, &views, &dashboard)?;
    }
    Ok(())
}
