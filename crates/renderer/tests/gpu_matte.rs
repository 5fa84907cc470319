use image::{Rgba, RgbaImage};
use renderer::{
    reference, Canvas, FrameRenderer, GpuContext, GpuPowerPreference, MatteRenderer, Orientation,
    RenderError, ShaderProgram, ShaderSources, VERTEX_SHADER_GLSL,
};

fn gpu_or_skip() -> Option<GpuContext> {
    match GpuContext::headless(GpuPowerPreference::Low) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping GPU test: {err}");
            None
        }
    }
}

/// Packed frame whose colour and matte halves hold distinct gradients.
fn packed_frame(orientation: Orientation, sub_width: u32, sub_height: u32) -> RgbaImage {
    let (width, height) = match orientation {
        Orientation::Horizontal => (sub_width * 2, sub_height),
        Orientation::Vertical => (sub_width, sub_height * 2),
    };
    RgbaImage::from_fn(width, height, |x, y| {
        let in_matte = match orientation {
            Orientation::Horizontal => x >= sub_width,
            Orientation::Vertical => y >= sub_height,
        };
        if in_matte {
            Rgba([(x * 13 + y * 7) as u8, 9, 9, 255])
        } else {
            Rgba([(x * 20) as u8, (y * 20) as u8, 128, 255])
        }
    })
}

#[test]
fn gpu_output_matches_reference_for_both_orientations() {
    let Some(gpu) = gpu_or_skip() else {
        return;
    };
    let canvas = Canvas::new(&gpu, 1, 1).expect("canvas");
    let mut renderer =
        MatteRenderer::new(gpu, Some(canvas), &ShaderSources::default()).expect("renderer");

    for orientation in Orientation::ALL {
        let frame = packed_frame(orientation, 8, 6);
        renderer.set_texture(&frame).expect("upload");
        renderer.render(8, 6, orientation).expect("render");
        let pixels = renderer.read_pixels().expect("readback");
        let expected = reference::composite(&frame, orientation, 8, 6).unwrap();
        assert_eq!(pixels.dimensions(), (8, 6));
        for (actual, wanted) in pixels.pixels().zip(expected.pixels()) {
            for channel in 0..4 {
                let diff = actual[channel].abs_diff(wanted[channel]);
                assert!(
                    diff <= 2,
                    "{orientation}: got {:?}, expected {:?}",
                    actual.0,
                    wanted.0
                );
            }
        }
        assert_eq!(renderer.canvas_size(), (8, 6));
    }
}

#[test]
fn upscaled_output_keeps_colour_and_matte_apart() {
    let Some(gpu) = gpu_or_skip() else {
        return;
    };
    let canvas = Canvas::new(&gpu, 8, 8).expect("canvas");
    let mut renderer =
        MatteRenderer::new(gpu, Some(canvas), &ShaderSources::default()).expect("renderer");

    let mut solid = RgbaImage::new(4, 2);
    for y in 0..2 {
        for x in 0..2 {
            solid.put_pixel(x, y, Rgba([200, 120, 40, 255]));
            solid.put_pixel(x + 2, y, Rgba([90, 90, 90, 255]));
        }
    }
    renderer.set_texture(&solid).expect("upload");
    renderer.render(8, 8, Orientation::Horizontal).expect("render");
    let pixels = renderer.read_pixels().expect("readback");
    for (x, y, pixel) in pixels.enumerate_pixels() {
        assert_eq!(pixel.0, [200, 120, 40, 90], "seam bleed at ({x}, {y})");
    }

    for orientation in Orientation::ALL {
        let frame = packed_frame(orientation, 4, 3);
        renderer.set_texture(&frame).expect("upload");
        renderer.render(8, 6, orientation).expect("render");
        let pixels = renderer.read_pixels().expect("readback");
        let expected = reference::composite(&frame, orientation, 8, 6).unwrap();
        for (actual, wanted) in pixels.pixels().zip(expected.pixels()) {
            assert_eq!(actual.0, wanted.0, "{orientation} at 2x scale");
        }
    }
}

#[test]
fn missing_canvas_is_reported_as_not_ready() {
    let Some(gpu) = gpu_or_skip() else {
        return;
    };
    let err = MatteRenderer::new(gpu, None, &ShaderSources::default())
        .err()
        .expect("missing canvas should fail");
    assert!(matches!(err, RenderError::MissingSurface));
    assert!(!err.is_fatal());
}

#[test]
fn invalid_fragment_fails_program_construction() {
    let Some(gpu) = gpu_or_skip() else {
        return;
    };
    let err = ShaderProgram::new(&gpu, VERTEX_SHADER_GLSL, "#version 450\nvoid main( {")
        .err()
        .expect("broken shader should fail");
    assert!(matches!(err, RenderError::ShaderCompile { .. }));
    assert!(err.is_fatal());
}

#[test]
fn render_before_upload_is_rejected() {
    let Some(gpu) = gpu_or_skip() else {
        return;
    };
    let canvas = Canvas::new(&gpu, 4, 4).expect("canvas");
    let mut renderer =
        MatteRenderer::new(gpu, Some(canvas), &ShaderSources::default()).expect("renderer");
    let err = renderer.render(4, 4, Orientation::Horizontal).unwrap_err();
    assert!(matches!(err, RenderError::InvalidFrame(_)));
}
