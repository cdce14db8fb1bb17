fn main() -> anyhow::Result<()> {
    formkit::cli::main()
}
