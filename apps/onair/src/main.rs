fn main() -> anyhow::Result<()> {
    onair::run()
}
