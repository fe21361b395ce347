use anyhow::Result;

fn main() -> Result<()> {
    sitepack::cli::run::<String>(None)
}
