fn main() -> anyhow::Result<()> {
    log_grok::run()
}
