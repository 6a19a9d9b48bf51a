use anyhow::Result;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ResolutionArgs) -> Result<()> {
    println!("{}", hexmap::resolution(args.zoom));
    Ok(())
}
