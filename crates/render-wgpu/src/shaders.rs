/// Instanced cubes into the color and normal targets plus depth.
///
/// Cubes are lit by a single white ambient light, so the color target holds
/// flat palette colors and all shading comes from the occlusion pass.
pub const BASE_SHADER: &str = r#"
const AMBIENT_INTENSITY: f32 = 1.0;

struct Camera {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct GBufferOutput {
    @location(0) color: vec4<f32>,
    @location(1) normal: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = camera.view_proj * world_pos;
    out.view_normal = normalize((camera.view * vec4<f32>(world_normal, 0.0)).xyz);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> GBufferOutput {
    var out: GBufferOutput;
    out.color = vec4<f32>(in.color.rgb * AMBIENT_INTENSITY, in.color.a);
    out.normal = vec4<f32>(normalize(in.view_normal) * 0.5 + 0.5, 1.0);
    return out;
}
"#;

/// Fullscreen screen-space ambient occlusion over the base pass output.
pub const SSAO_SHADER: &str = r#"
struct SsaoUniforms {
    projection: mat4x4<f32>,
    inverse_projection: mat4x4<f32>,
    kernel: array<vec4<f32>, 32>,
    output_size: vec2<f32>,
    kernel_radius: f32,
    kernel_size: u32,
    min_distance: f32,
    max_distance: f32,
    near: f32,
    far: f32,
};

@group(0) @binding(0)
var<uniform> params: SsaoUniforms;
@group(0) @binding(1)
var color_tex: texture_2d<f32>;
@group(0) @binding(2)
var normal_tex: texture_2d<f32>;
@group(0) @binding(3)
var depth_tex: texture_depth_2d;

struct FullscreenOutput {
    @builtin(position) position: vec4<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    var out: FullscreenOutput;
    out.position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    return out;
}

fn texel(uv: vec2<f32>) -> vec2<i32> {
    let dims = vec2<f32>(textureDimensions(depth_tex));
    return vec2<i32>(clamp(uv * dims, vec2<f32>(0.0), dims - vec2<f32>(1.0)));
}

fn view_position(uv: vec2<f32>, depth: f32) -> vec3<f32> {
    let ndc = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, depth, 1.0);
    let view = params.inverse_projection * ndc;
    return view.xyz / view.w;
}

fn linear_depth(view_z: f32) -> f32 {
    return (-view_z - params.near) / (params.far - params.near);
}

fn hash(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(12.9898, 78.233))) * 43758.5453);
}

@fragment
fn fs_ssao(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let uv = in.position.xy / params.output_size;
    let coord = texel(uv);
    let color = textureLoad(color_tex, coord, 0);
    let depth = textureLoad(depth_tex, coord, 0);
    if depth >= 1.0 {
        return color;
    }

    let origin = view_position(uv, depth);
    let normal = normalize(textureLoad(normal_tex, coord, 0).xyz * 2.0 - 1.0);
    let angle = hash(in.position.xy) * 6.2831853;
    let random = vec3<f32>(cos(angle), sin(angle), 0.0);
    let tangent = normalize(random - normal * dot(random, normal));
    let bitangent = cross(normal, tangent);
    let tbn = mat3x3<f32>(tangent, bitangent, normal);

    var occlusion = 0.0;
    for (var i = 0u; i < params.kernel_size; i = i + 1u) {
        let sample_view = origin + tbn * params.kernel[i].xyz * params.kernel_radius;
        let clip = params.projection * vec4<f32>(sample_view, 1.0);
        let ndc = clip.xy / clip.w;
        let sample_uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
        if any(sample_uv < vec2<f32>(0.0)) || any(sample_uv > vec2<f32>(1.0)) {
            continue;
        }
        let scene_raw = textureLoad(depth_tex, texel(sample_uv), 0);
        let scene_depth = linear_depth(view_position(sample_uv, scene_raw).z);
        let delta = linear_depth(sample_view.z) - scene_depth;
        if delta > params.min_distance && delta < params.max_distance {
            occlusion = occlusion + 1.0;
        }
    }

    let ao = 1.0 - occlusion / f32(max(params.kernel_size, 1u));
    return vec4<f32>(color.rgb * ao, color.a);
}
"#;
