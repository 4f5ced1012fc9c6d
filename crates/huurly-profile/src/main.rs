fn main() -> anyhow::Result<()> {
    huurly_profile::cli::main()
}
