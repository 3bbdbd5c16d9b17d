fn main() -> anyhow::Result<()> {
    nextlevel::cli::run_cli()
}
