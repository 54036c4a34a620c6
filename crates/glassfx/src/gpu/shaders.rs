//! WGSL sources. Every program shares the full-screen triangle vertex stage
//! and one bind group: uniforms, source texture, sampler.

/// Full-screen triangle with a top-left UV origin.
pub(crate) const VERTEX: &str = r"
struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn main(@builtin(vertex_index) index: u32) -> VertexOut {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -3.0),
        vec2<f32>(3.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let pos = positions[index];
    var out: VertexOut;
    out.position = vec4<f32>(pos, 0.0, 1.0);
    out.uv = vec2<f32>(pos.x * 0.5 + 0.5, 0.5 - pos.y * 0.5);
    return out;
}
";

pub(crate) const BLIT: &str = r"
struct Blit {
    src_rect: vec4<f32>,
    clamp_rect: vec4<f32>,
};

@group(0) @binding(0) var<uniform> params: Blit;
@group(0) @binding(1) var source: texture_2d<f32>;
@group(0) @binding(2) var source_sampler: sampler;

@fragment
fn main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let coord = clamp(
        params.src_rect.xy + uv * params.src_rect.zw,
        params.clamp_rect.xy,
        params.clamp_rect.zw,
    );
    return textureSampleLevel(source, source_sampler, coord, 0.0);
}
";

pub(crate) const BLUR: &str = r"
struct Blur {
    step: vec4<f32>,
    offsets: vec4<f32>,
    weights: vec4<f32>,
};

@group(0) @binding(0) var<uniform> params: Blur;
@group(0) @binding(1) var source: texture_2d<f32>;
@group(0) @binding(2) var source_sampler: sampler;

@fragment
fn main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    var color = textureSampleLevel(source, source_sampler, uv, 0.0) * params.step.z;
    let count = u32(params.step.w);
    for (var i = 0u; i < 4u; i = i + 1u) {
        if (i >= count) {
            break;
        }
        let offset = params.step.xy * params.offsets[i];
        let ahead = textureSampleLevel(source, source_sampler, uv + offset, 0.0);
        let behind = textureSampleLevel(source, source_sampler, uv - offset, 0.0);
        color = color + (ahead + behind) * params.weights[i];
    }
    return color;
}
";

pub(crate) const GLASS: &str = r"
struct Glass {
    area: vec4<f32>,
    shape: vec4<f32>,
    optics: vec4<f32>,
    body: vec4<f32>,
    tone: vec4<f32>,
    adapt: vec4<f32>,
    tint: vec4<f32>,
};

@group(0) @binding(0) var<uniform> glass: Glass;
@group(0) @binding(1) var blurred: texture_2d<f32>;
@group(0) @binding(2) var blurred_sampler: sampler;

const LUMA = vec3<f32>(0.2126, 0.7152, 0.0722);

fn sample_blurred(wuv: vec2<f32>) -> vec4<f32> {
    let pad = glass.shape.xy;
    let tex = clamp(wuv * (1.0 - 2.0 * pad) + pad, vec2<f32>(0.001), vec2<f32>(0.999));
    return textureSampleLevel(blurred, blurred_sampler, tex, 0.0);
}

fn lp_norm(v: vec2<f32>, p: f32) -> f32 {
    return pow(pow(abs(v.x), p) + pow(abs(v.y), p), 1.0 / p);
}

fn rounded_box_sdf(uv: vec2<f32>, full: vec2<f32>, radius: f32, power: f32) -> f32 {
    let p = (uv - 0.5) * full;
    let half_size = full * 0.5;
    let r = min(radius, min(half_size.x, half_size.y));
    let q = abs(p) - half_size + r;
    return min(max(q.x, q.y), 0.0) + lp_norm(max(q, vec2<f32>(0.0)), power) - r;
}

@fragment
fn main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
    let full = glass.area.zw;
    let uv = (frag.xy - glass.area.xy) / full;
    let sdf = rounded_box_sdf(uv, full, glass.shape.z, max(glass.shape.w, 1.0));
    if (sdf > 0.0) {
        discard;
    }
    let corner_alpha = 1.0 - smoothstep(-1.5, 0.5, sdf);
    if (corner_alpha < 0.001) {
        discard;
    }

    let min_dim = min(full.x, full.y);
    let bezel = max(glass.body.y * min_dim, 0.001);
    let edge = exp(sdf / bezel);
    var inward = (vec2<f32>(0.5) - uv) * full;
    let len = length(inward);
    if (len > 0.1) {
        inward = inward / len;
    } else {
        inward = vec2<f32>(0.0);
    }

    let base = inward * edge * glass.optics.x * 50.0 / full;
    let spread = glass.optics.y * 0.35;
    var dome = vec2<f32>(0.0);
    if (glass.body.z > 0.001) {
        let c = (uv - 0.5) * 2.0;
        let grad = vec2<f32>(-4.0 * c.x * (1.0 - c.y * c.y), -4.0 * c.y * (1.0 - c.x * c.x));
        dome = grad * glass.body.z * min_dim * 0.006 * (1.0 - edge) / full;
    }

    var color: vec3<f32>;
    if (glass.optics.y > 0.001 && edge > 0.01) {
        color = vec3<f32>(
            sample_blurred(uv + base * (1.0 - spread) + dome).r,
            sample_blurred(uv + base + dome).g,
            sample_blurred(uv + base * (1.0 + spread) + dome).b,
        );
    } else {
        color = sample_blurred(uv + base + dome).rgb;
    }

    let blurred_lum = dot(color, LUMA);
    color = mix(vec3<f32>(blurred_lum), color, glass.tone.y);
    let lum_curve = smoothstep(0.25, 0.55, blurred_lum);
    color = color * glass.body.w * (1.0 - glass.adapt.x * lum_curve)
        + vec3<f32>(glass.adapt.y * (1.0 - lum_curve) * 0.5);
    color = mix(vec3<f32>(0.5), color, glass.tone.x);

    let current_lum = dot(color, LUMA);
    let chroma = max(color.r, max(color.g, color.b)) - min(color.r, min(color.g, color.b));
    let dark = 1.0 - glass.tone.w * (1.0 - blurred_lum);
    color = mix(vec3<f32>(current_lum), color, 1.0 + glass.tone.z * chroma * dark);

    color = mix(color, glass.tint.rgb, glass.tint.a);

    let rim = edge * edge;
    if (glass.optics.z > 0.001) {
        color = color + vec3<f32>(rim * glass.optics.z * 0.15);
    }
    if (glass.optics.w > 0.001) {
        let top = pow(max(1.0 - uv.y, 0.0), 2.0);
        color = color + vec3<f32>(1.0, 0.99, 0.97) * top * rim * glass.optics.w * 0.08;
    }
    color = color * (1.0 - uv.y * uv.y * rim * 0.06);

    let alpha = clamp(glass.body.x * corner_alpha, 0.0, 1.0);
    return vec4<f32>(clamp(color, vec3<f32>(0.0), vec3<f32>(1.0)), alpha);
}
";
