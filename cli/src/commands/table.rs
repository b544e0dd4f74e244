use anyhow::Result;
use sdgmap::write_feature_table;

pub async fn run(_cli: &crate::cli::Cli, args: &crate::cli::TableArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or("./features.csv".into());
    let (view, _) = super::load_view(&args.view, 0.0).await?;

    write_feature_table(view.state(), &args.layer, &out_path)?;
    println!("[table] wrote {} (year {})", out_path.display(), view.current_year());
    Ok(())
}
