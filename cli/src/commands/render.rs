use anyhow::Result;
use sdgmap::render_svg;

pub async fn run(_cli: &crate::cli::Cli, args: &crate::cli::RenderArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or("./map.svg".into());
    let (view, _) = super::load_view(&args.view, args.zoom).await?;

    let layers = view.state().visibility().layers_at(args.zoom);
    if layers.is_empty() {
        anyhow::bail!("No layer is visible at zoom {}", args.zoom);
    }

    println!("[render] year {} at zoom {}: layers {layers:?}", view.current_year(), args.zoom);
    render_svg(view.state(), &layers, &out_path)?;
    println!("[render] wrote {}", out_path.display());
    Ok(())
}
