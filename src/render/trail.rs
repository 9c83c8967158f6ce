use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::pipeline::{blended_target, screen_layout};
use super::view::PlanView;

/// Per-vertex data for untextured geometry: trail segments and petal triangles.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 2],
    pub color: [f32; 4], // premultiplied RGBA
}

impl ColorVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4, // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Number of trail points stored per butterfly.
const TRAIL_POINTS: usize = 40;
/// Maximum butterflies tracked.
const MAX_TRAILS: usize = 1024;
/// Max trail vertices (2 per line segment, segments = points-1 per butterfly).
pub const MAX_TRAIL_VERTICES: usize = MAX_TRAILS * (TRAIL_POINTS - 1) * 2;
/// Sample trail position every N frames.
const TRAIL_SAMPLE_INTERVAL: u32 = 4;
/// Opacity of the newest segment.
const TRAIL_ALPHA: f32 = 0.6;

/// Ring buffer of recent world positions of one butterfly.
struct Trail {
    points: [Vec3; TRAIL_POINTS],
    head: usize,
    len: usize,
    color: [f32; 3],
}

impl Trail {
    fn new(color: [f32; 3]) -> Self {
        Self {
            points: [Vec3::ZERO; TRAIL_POINTS],
            head: 0,
            len: 0,
            color,
        }
    }

    fn push(&mut self, p: Vec3) {
        self.points[self.head] = p;
        self.head = (self.head + 1) % TRAIL_POINTS;
        if self.len < TRAIL_POINTS {
            self.len += 1;
        }
    }

    /// Index of the `i`-th stored point, oldest first.
    fn slot(&self, i: usize) -> usize {
        (self.head + TRAIL_POINTS - self.len + i) % TRAIL_POINTS
    }
}

/// Flight trails for every butterfly, kept in world space so they survive
/// window resizes.
pub struct TrailSystem {
    trails: Vec<Trail>,
    frame_counter: u32,
    vertex_buf: Vec<ColorVertex>,
    pub enabled: bool,
}

impl TrailSystem {
    pub fn new() -> Self {
        Self {
            trails: Vec::new(),
            frame_counter: 0,
            vertex_buf: Vec::new(),
            enabled: false,
        }
    }

    /// Record butterfly positions. Call once per frame with one entry per
    /// butterfly, always in the same order.
    pub fn update(&mut self, samples: &[(Vec3, [f32; 3])]) {
        self.frame_counter = self.frame_counter.wrapping_add(1);

        while self.trails.len() < samples.len() {
            self.trails.push(Trail::new([1.0; 3]));
        }
        self.trails.truncate(samples.len());

        if self.frame_counter % TRAIL_SAMPLE_INTERVAL != 0 {
            return;
        }

        for (trail, &(p, color)) in self.trails.iter_mut().zip(samples) {
            trail.color = color;
            trail.push(p);
        }
    }

    /// Line-list vertices, fading from transparent (oldest) to `TRAIL_ALPHA`.
    pub fn build_vertices(&mut self, view: &PlanView) -> &[ColorVertex] {
        self.vertex_buf.clear();

        for trail in &self.trails {
            if trail.len < 2 {
                continue;
            }

            for i in 0..(trail.len - 1) {
                let a = view.to_screen(trail.points[trail.slot(i)]);
                let b = view.to_screen(trail.points[trail.slot(i + 1)]);

                let alpha = i as f32 / (trail.len - 1) as f32 * TRAIL_ALPHA;
                let [r, g, bl] = trail.color.map(|c| c * alpha);
                let color = [r, g, bl, alpha];

                self.vertex_buf.push(ColorVertex {
                    position: a.into(),
                    color,
                });
                self.vertex_buf.push(ColorVertex {
                    position: b.into(),
                    color,
                });
            }
        }

        &self.vertex_buf
    }
}

impl Default for TrailSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU pipeline for untextured, premultiplied [`ColorVertex`] geometry.
/// Trails use it with `LineList`, petals with `TriangleList`.
pub struct ColorPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub screen_bind_group: wgpu::BindGroup,
    pub num_vertices: u32,
    max_vertices: usize,
}

impl ColorPipeline {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        screen_uniform_buffer: &wgpu::Buffer,
        topology: wgpu::PrimitiveTopology,
        max_vertices: usize,
        label: &str,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("color_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/color.wgsl").into()),
        });

        let bind_group_layout = screen_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ColorVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[blended_target(format)],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (max_vertices * std::mem::size_of::<ColorVertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            vertex_buffer,
            screen_bind_group,
            num_vertices: 0,
            max_vertices,
        }
    }

    /// Upload this frame's vertices. Anything past the buffer size is dropped.
    pub fn update_vertices(&mut self, queue: &wgpu::Queue, vertices: &[ColorVertex]) {
        let count = vertices.len().min(self.max_vertices);
        self.num_vertices = count as u32;
        if count > 0 {
            queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&vertices[..count]),
            );
        }
    }

    /// Record a draw into an open render pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.num_vertices == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.screen_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.num_vertices, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> PlanView {
        PlanView {
            center: glam::Vec2::ZERO,
            scale: 10.0,
        }
    }

    #[test]
    fn trails_sample_every_few_frames() {
        let mut trails = TrailSystem::new();
        for i in 0..(TRAIL_SAMPLE_INTERVAL * 3) {
            trails.update(&[(Vec3::new(i as f32, 0.0, 0.0), [1.0, 0.0, 0.0])]);
        }
        // 3 samples -> 2 segments -> 4 vertices
        assert_eq!(trails.build_vertices(&view()).len(), 4);
    }

    #[test]
    fn trails_fade_towards_the_tail() {
        let mut trails = TrailSystem::new();
        for i in 0..(TRAIL_SAMPLE_INTERVAL * 5) {
            trails.update(&[(Vec3::new(0.0, 0.0, i as f32), [1.0, 1.0, 1.0])]);
        }
        let verts = trails.build_vertices(&view());
        let first = verts.first().unwrap().color[3];
        let last = verts.last().unwrap().color[3];
        assert_eq!(first, 0.0);
        assert!(last > first);
        assert!(last <= TRAIL_ALPHA);
    }

    #[test]
    fn trail_count_follows_the_flock() {
        let mut trails = TrailSystem::new();
        let two = [(Vec3::ZERO, [1.0; 3]), (Vec3::ONE, [1.0; 3])];
        for _ in 0..(TRAIL_SAMPLE_INTERVAL * 2) {
            trails.update(&two);
        }
        assert_eq!(trails.build_vertices(&view()).len(), 4);
        trails.update(&two[..1]);
        assert_eq!(trails.build_vertices(&view()).len(), 2);
    }
}
