use slice_volume::anomaly::AnomalyPolicy;
use slice_volume::{Pipeline, PipelineParams, Session, SliceStack};

fn main() {
    env_logger::init();
    // Demo: a bright sphere inside a dim 48^3 volume
    let n = 48usize;
    let radius = 12.0f32;
    let center = (n as f32 - 1.0) / 2.0;
    let buffers = (0..n)
        .map(|z| {
            let mut data = vec![200u16; n * n];
            for y in 0..n {
                for x in 0..n {
                    let d = ((x as f32 - center).powi(2)
                        + (y as f32 - center).powi(2)
                        + (z as f32 - center).powi(2))
                    .sqrt();
                    if d <= radius {
                        data[y * n + x] = 3000;
                    }
                }
            }
            data
        })
        .collect();
    let stack = SliceStack::from_buffers(n, n, buffers);

    let params = PipelineParams {
        anomaly: AnomalyPolicy {
            max_area: Some(5000),
            ..AnomalyPolicy::default()
        },
        ..PipelineParams::default()
    };
    let mut session = Session::new();
    let result = Pipeline::new(params).and_then(|p| p.run(&stack, &mut session));
    match result {
        Ok(output) => {
            let (vertices, faces) = output
                .mesh
                .as_ref()
                .map_or((0, 0), |m| (m.vertex_count(), m.face_count()));
            println!(
                "vertices={} faces={} regions={} markers={} total_ms={:.3}",
                vertices,
                faces,
                output.labeling.regions.len(),
                session.markers().len(),
                output.timings.total_ms
            );
            for marker in session.markers() {
                println!(
                    "  {} at ({:.1}, {:.1}, {:.1}) slice {}",
                    marker.tag, marker.position[0], marker.position[1], marker.position[2], marker.slice
                );
            }
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
