fn main() {
    #[cfg(feature = "cli")]
    nanozip::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("nanozip: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
