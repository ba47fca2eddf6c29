mod cli;

fn main() -> anyhow::Result<()> {
    strokectl::logging::init();
    cli::run()
}
