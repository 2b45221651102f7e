use clap::Parser;
use ssao_viewer::Cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = ssao_viewer::run(&cli) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
