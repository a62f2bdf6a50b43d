fn main() -> anyhow::Result<()> {
    scalebench_cli::run()
}
