use clap::Parser;
use color_eyre::Result;
use volume_stats_exporter::{
    init_errors,
    init_logging,
    App,
    Args,
};

fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    init_logging(args.verbose)?;
    App::new(args)?.run()
}
