fn main() -> anyhow::Result<()> {
    bake_cli::internal_main()
}
