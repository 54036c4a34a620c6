//! Software version of the glass fragment program.

use crate::params::CompositeParams;

type Rgb = [f32; 3];

const LUMA: Rgb = [0.2126, 0.7152, 0.0722];

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn dot(a: Rgb, b: Rgb) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

fn splat(v: f32) -> Rgb {
    [v, v, v]
}

fn lp_norm(x: f32, y: f32, power: f32) -> f32 {
    (x.abs().powf(power) + y.abs().powf(power)).powf(1.0 / power)
}

/// Signed distance to the rounded surface outline, in pixels.
fn rounded_box_sdf(uv: [f32; 2], full: [f32; 2], radius: f32, power: f32) -> f32 {
    let px = (uv[0] - 0.5) * full[0];
    let py = (uv[1] - 0.5) * full[1];
    let half = [full[0] * 0.5, full[1] * 0.5];
    let r = radius.min(half[0].min(half[1]));
    let qx = px.abs() - half[0] + r;
    let qy = py.abs() - half[1] + r;
    qx.max(qy).min(0.0) + lp_norm(qx.max(0.0), qy.max(0.0), power) - r
}

fn refraction_dir(uv: [f32; 2], full: [f32; 2]) -> [f32; 2] {
    let x = (0.5 - uv[0]) * full[0];
    let y = (0.5 - uv[1]) * full[1];
    let len = (x * x + y * y).sqrt();
    if len > 0.1 {
        [x / len, y / len]
    } else {
        [0.0, 0.0]
    }
}

/// Shades one fragment at surface UV `uv`. `sample` reads the blurred
/// capture at a texture UV. Returns `None` outside the rounded outline.
pub(crate) fn shade<S>(params: &CompositeParams, uv: [f32; 2], sample: S) -> Option<[f32; 4]>
where
    S: Fn([f32; 2]) -> [f32; 4],
{
    let full = params.full_size();
    let pad = params.uv_padding;
    let power = params.rounding_power.max(1.0);
    let sample_blurred = |wuv: [f32; 2]| {
        let tex = [
            (wuv[0] * (1.0 - 2.0 * pad[0]) + pad[0]).clamp(0.001, 0.999),
            (wuv[1] * (1.0 - 2.0 * pad[1]) + pad[1]).clamp(0.001, 0.999),
        ];
        sample(tex)
    };

    let sdf = rounded_box_sdf(uv, full, params.corner_radius, power);
    if sdf > 0.0 {
        return None;
    }
    let corner_alpha = 1.0 - smoothstep(-1.5, 0.5, sdf);
    if corner_alpha < 0.001 {
        return None;
    }

    let min_dim = full[0].min(full[1]);
    let bezel = (params.edge_thickness * min_dim).max(1e-3);
    let edge = (sdf / bezel).exp();
    let inward = refraction_dir(uv, full);

    let refraction = edge * params.refraction_strength * 50.0;
    let base = [inward[0] * refraction / full[0], inward[1] * refraction / full[1]];
    let spread = params.chromatic_aberration * 0.35;

    let mut dome = [0.0, 0.0];
    if params.lens_distortion > 0.001 {
        let cx = (uv[0] - 0.5) * 2.0;
        let cy = (uv[1] - 0.5) * 2.0;
        let grad = [-4.0 * cx * (1.0 - cy * cy), -4.0 * cy * (1.0 - cx * cx)];
        let lens = params.lens_distortion * min_dim * 0.006 * (1.0 - edge);
        dome = [grad[0] * lens / full[0], grad[1] * lens / full[1]];
    }

    let offset_uv = |scale: f32| {
        [
            uv[0] + base[0] * scale + dome[0],
            uv[1] + base[1] * scale + dome[1],
        ]
    };
    let mut color: Rgb = if params.chromatic_aberration > 0.001 && edge > 0.01 {
        [
            sample_blurred(offset_uv(1.0 - spread))[0],
            sample_blurred(offset_uv(1.0))[1],
            sample_blurred(offset_uv(1.0 + spread))[2],
        ]
    } else {
        let texel = sample_blurred(offset_uv(1.0));
        [texel[0], texel[1], texel[2]]
    };

    // tone
    let blurred_lum = dot(color, LUMA);
    color = mix(splat(blurred_lum), color, params.saturation);
    let lum_curve = smoothstep(0.25, 0.55, blurred_lum);
    let dim = params.brightness * (1.0 - params.adaptive_dim * lum_curve);
    color = color.map(|c| c * dim + params.adaptive_boost * (1.0 - lum_curve) * 0.5);
    color = mix(splat(0.5), color, params.contrast);

    let current_lum = dot(color, LUMA);
    let chroma = color[0].max(color[1].max(color[2])) - color[0].min(color[1].min(color[2]));
    let dark_factor = 1.0 - params.vibrancy_darkness * (1.0 - blurred_lum);
    color = mix(
        splat(current_lum),
        color,
        1.0 + params.vibrancy * chroma * dark_factor,
    );

    color = mix(color, params.tint_color, params.tint_alpha);

    let rim = edge * edge;
    if params.fresnel_strength > 0.001 {
        let fresnel = rim * params.fresnel_strength * 0.15;
        color = color.map(|c| c + fresnel);
    }
    if params.specular_strength > 0.001 {
        let top = (1.0 - uv[1]).max(0.0).powi(2);
        let highlight = top * rim * params.specular_strength * 0.08;
        color = [
            color[0] + highlight,
            color[1] + 0.99 * highlight,
            color[2] + 0.97 * highlight,
        ];
    }
    let shadow = uv[1].powi(2) * rim * 0.06;
    color = color.map(|c| c * (1.0 - shadow));

    let alpha = (params.glass_opacity * corner_alpha).clamp(0.0, 1.0);
    Some([
        color[0].clamp(0.0, 1.0),
        color[1].clamp(0.0, 1.0),
        color[2].clamp(0.0, 1.0),
        alpha,
    ])
}
