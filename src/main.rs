fn main() -> anyhow::Result<()> {
    daily_tasks::cli::run()
}
