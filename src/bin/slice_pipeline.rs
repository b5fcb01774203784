use slice_volume::config::slice_pipeline::{self, SlicePipelineConfig};
use slice_volume::image::io::{
    load_grayscale_u16, save_mask_png, save_orthogonal_previews, write_json_file,
};
use slice_volume::isosurface::save_mesh;
use slice_volume::{Pipeline, Session, Slice, SliceStack};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = slice_pipeline::load_config(Path::new(&config_path))?;
    let params = config.resolve().map_err(|e| e.to_string())?;
    let pipeline = Pipeline::new(params).map_err(|e| e.to_string())?;

    let stack = load_stack(&config)?;
    let mut session = Session::new();
    if !config.commands.is_empty() {
        session.set_marking(true);
        session.apply(config.commands.iter().cloned());
    }

    let output = pipeline
        .run(&stack, &mut session)
        .map_err(|e| e.to_string())?;

    if let (Some(mesh), Some(path)) = (&output.mesh, config.output.mesh_path()) {
        save_mesh(mesh, &path)?;
        println!(
            "Saved mesh with {} vertices / {} faces to {}",
            mesh.vertex_count(),
            mesh.face_count(),
            path.display()
        );
    }
    if let (Some(mesh), Some(path)) = (&output.mask_mesh, config.output.mask_mesh_path()) {
        save_mesh(mesh, &path)?;
        println!(
            "Saved mask mesh with {} vertices / {} faces to {}",
            mesh.vertex_count(),
            mesh.face_count(),
            path.display()
        );
    }
    if let Some(path) = config.output.markers_path() {
        write_json_file(&path, session.markers())?;
        println!("Saved {} markers to {}", session.markers().len(), path.display());
    }
    if let Some(dir) = config.output.mask_dir() {
        for z in 0..output.mask.depth() {
            save_mask_png(&output.mask, z, &dir.join(format!("mask_{z:04}.png")))?;
        }
        println!("Saved {} mask slices to {}", output.mask.depth(), dir.display());
    }
    if let Some(dir) = config.output.preview_dir() {
        let written = save_orthogonal_previews(&output.volume, &dir)?;
        println!("Saved {} previews to {}", written.len(), dir.display());
    }
    if let Some(path) = config.output.report_path() {
        write_json_file(&path, &output.report())?;
        println!("Saved run report to {}", path.display());
    }

    println!(
        "regions={} flagged={} total_ms={:.3}",
        output.labeling.regions.len(),
        output.anomalies.markers.len(),
        output.timings.total_ms
    );
    Ok(())
}

fn load_stack(config: &SlicePipelineConfig) -> Result<SliceStack, String> {
    let mut stack = SliceStack::new();
    for (index, path) in config.slice_paths() {
        let image = load_grayscale_u16(&path)?;
        stack.push(Slice::new(index, image.h, image.w, image.data));
    }
    Ok(stack)
}

fn usage() -> String {
    "Usage: slice_pipeline <config.json>".to_string()
}
