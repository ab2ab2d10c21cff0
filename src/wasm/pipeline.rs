//! Shader program setup for the square field.
//!
//! Every attribute and uniform slot is resolved once at link time. The
//! renderer only ever touches the cached handles.

use glam::{Mat4, Vec2};
use js_sys::Float32Array;
use web_sys::{
    WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

use crate::config::{GridConfig, Palette};
use crate::error::{GridError, Result, ShaderStage};
use crate::grid::Cell;

pub const VERTEX_SHADER: &str = r#"#version 300 es
in vec2 a_position;
in vec2 a_anchor;
in float a_size;

uniform mat4 u_view;
uniform mat4 u_projection;
uniform float u_min_size;
uniform float u_max_size;

out vec2 v_local;

void main() {
    float size = clamp(a_size, u_min_size, u_max_size);
    v_local = a_position;
    vec2 world = a_anchor + a_position * size;
    gl_Position = u_projection * u_view * vec4(world, 0.0, 1.0);
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

uniform vec3 u_front_color;

in vec2 v_local;
out vec4 out_color;

void main() {
    // hard square footprint
    float edge = max(abs(v_local.x), abs(v_local.y));
    float alpha = edge <= 0.5 ? 1.0 : 0.0;
    out_color = vec4(u_front_color, alpha);
}
"#;

/// Unit square centered on the origin, wound for `TRIANGLE_FAN`.
const QUAD: [f32; 8] = [-0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, 0.5];

/// Attribute 0 must always be array-backed on some drivers.
const POSITION_LOCATION: u32 = 0;

#[derive(Clone, Copy, Debug)]
pub struct AttributeSlots {
    pub position: u32,
    pub anchor: u32,
    pub size: u32,
}

#[derive(Clone, Debug)]
pub struct UniformSlots {
    pub view: WebGlUniformLocation,
    pub projection: WebGlUniformLocation,
    pub front_color: WebGlUniformLocation,
    // Not every shader pair reads these; the built-in fragment stage does not.
    pub pointer: Option<WebGlUniformLocation>,
    pub proximity: Option<WebGlUniformLocation>,
    pub min_size: Option<WebGlUniformLocation>,
    pub max_size: Option<WebGlUniformLocation>,
    pub ease_in: Option<WebGlUniformLocation>,
    pub ease_out: Option<WebGlUniformLocation>,
}

/// A linked program plus the shared quad geometry it draws.
pub struct Pipeline {
    gl: GL,
    program: WebGlProgram,
    quad: WebGlBuffer,
    vao: WebGlVertexArrayObject,
    pub attributes: AttributeSlots,
    pub uniforms: UniformSlots,
}

impl Pipeline {
    /// Compiles and links both stages, then caches every slot the renderer
    /// needs.
    pub fn new(gl: GL, vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let vertex = compile_shader(&gl, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile_shader(&gl, ShaderStage::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(err) => {
                gl.delete_shader(Some(&vertex));
                return Err(err);
            }
        };
        let program = link_program(&gl, &vertex, &fragment);
        gl.delete_shader(Some(&vertex));
        gl.delete_shader(Some(&fragment));
        let program = program?;

        let slots = attribute_slots(&gl, &program)
            .and_then(|attributes| Ok((attributes, uniform_slots(&gl, &program)?)));
        let (attributes, uniforms) = match slots {
            Ok(slots) => slots,
            Err(err) => {
                gl.delete_program(Some(&program));
                return Err(err);
            }
        };

        let (quad, vao) = match upload_quad(&gl, &attributes) {
            Ok(geometry) => geometry,
            Err(err) => {
                gl.delete_program(Some(&program));
                return Err(err);
            }
        };

        log::info!(
            "shader pipeline linked (position={}, anchor={}, size={})",
            attributes.position,
            attributes.anchor,
            attributes.size
        );

        Ok(Self {
            gl,
            program,
            quad,
            vao,
            attributes,
            uniforms,
        })
    }

    pub fn with_default_shaders(gl: GL) -> Result<Self> {
        Self::new(gl, VERTEX_SHADER, FRAGMENT_SHADER)
    }

    pub fn program(&self) -> &WebGlProgram {
        &self.program
    }

    pub fn quad(&self) -> &WebGlBuffer {
        &self.quad
    }

    /// Makes the program and the quad current.
    pub fn bind(&self) {
        self.gl.use_program(Some(&self.program));
        self.gl.bind_vertex_array(Some(&self.vao));
    }

    /// Uploads the uniforms that stay fixed for this configuration.
    pub fn apply_config(&self, config: &GridConfig, palette: &Palette) {
        let gl = &self.gl;
        let [r, g, b] = palette.front;
        gl.uniform3f(Some(&self.uniforms.front_color), r, g, b);

        let scalars = [
            (&self.uniforms.proximity, config.proximity_range),
            (&self.uniforms.min_size, config.min_size),
            (&self.uniforms.max_size, config.max_size),
            (&self.uniforms.ease_in, config.ease_in_duration),
            (&self.uniforms.ease_out, config.ease_out_duration),
        ];
        for (slot, value) in scalars {
            if let Some(slot) = slot {
                gl.uniform1f(Some(slot), value);
            }
        }
    }

    pub fn set_transforms(&self, view: &Mat4, projection: &Mat4) {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(&self.uniforms.view), false, &view.to_cols_array());
        self.gl.uniform_matrix4fv_with_f32_array(
            Some(&self.uniforms.projection),
            false,
            &projection.to_cols_array(),
        );
    }

    pub fn set_pointer(&self, pointer: Option<Vec2>) {
        if let (Some(slot), Some(pointer)) = (&self.uniforms.pointer, pointer) {
            self.gl.uniform2f(Some(slot), pointer.x, pointer.y);
        }
    }

    /// Draws the shared quad once, placed and scaled for `cell`.
    pub fn draw_cell(&self, cell: &Cell) {
        self.gl
            .vertex_attrib2f(self.attributes.anchor, cell.anchor.x, cell.anchor.y);
        self.gl.vertex_attrib1f(self.attributes.size, cell.current_size);
        self.gl.draw_arrays(GL::TRIANGLE_FAN, 0, 4);
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.gl.bind_vertex_array(None);
        self.gl.delete_vertex_array(Some(&self.vao));
        self.gl.delete_buffer(Some(&self.quad));
        self.gl.delete_program(Some(&self.program));
    }
}

/// Uploads the shared unit quad and records its layout in a vertex array.
fn upload_quad(gl: &GL, attributes: &AttributeSlots) -> Result<(WebGlBuffer, WebGlVertexArrayObject)> {
    let quad = gl
        .create_buffer()
        .ok_or_else(|| GridError::Dom("unable to allocate quad buffer".into()))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&quad));
    gl.buffer_data_with_array_buffer_view(
        GL::ARRAY_BUFFER,
        &Float32Array::from(&QUAD[..]),
        GL::STATIC_DRAW,
    );

    let Some(vao) = gl.create_vertex_array() else {
        gl.bind_buffer(GL::ARRAY_BUFFER, None);
        gl.delete_buffer(Some(&quad));
        return Err(GridError::Dom("unable to allocate vertex array".into()));
    };
    gl.bind_vertex_array(Some(&vao));
    gl.enable_vertex_attrib_array(attributes.position);
    gl.vertex_attrib_pointer_with_i32(attributes.position, 2, GL::FLOAT, false, 0, 0);
    // anchor and size are fed as per-draw constants
    gl.disable_vertex_attrib_array(attributes.anchor);
    gl.disable_vertex_attrib_array(attributes.size);
    gl.bind_vertex_array(None);
    gl.bind_buffer(GL::ARRAY_BUFFER, None);
    Ok((quad, vao))
}

fn compile_shader(gl: &GL, stage: ShaderStage, source: &str) -> Result<WebGlShader> {
    let kind = match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    };
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| GridError::Dom(format!("unable to create {stage} shader")))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        return Ok(shader);
    }

    let log = gl.get_shader_info_log(&shader).unwrap_or_default();
    gl.delete_shader(Some(&shader));
    Err(GridError::Compile { stage, log })
}

fn link_program(gl: &GL, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or_else(|| GridError::Dom("unable to create shader program".into()))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.bind_attrib_location(&program, POSITION_LOCATION, "a_position");
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    gl.detach_shader(&program, vertex);
    gl.detach_shader(&program, fragment);
    if linked {
        return Ok(program);
    }

    let log = gl.get_program_info_log(&program).unwrap_or_default();
    gl.delete_program(Some(&program));
    Err(GridError::Link(log))
}

fn attribute_slots(gl: &GL, program: &WebGlProgram) -> Result<AttributeSlots> {
    let lookup = |name: &'static str| {
        u32::try_from(gl.get_attrib_location(program, name))
            .map_err(|_| GridError::MissingAttribute(name))
    };
    Ok(AttributeSlots {
        position: lookup("a_position")?,
        anchor: lookup("a_anchor")?,
        size: lookup("a_size")?,
    })
}

fn uniform_slots(gl: &GL, program: &WebGlProgram) -> Result<UniformSlots> {
    let optional = |name: &str| gl.get_uniform_location(program, name);
    let required =
        |name: &'static str| optional(name).ok_or(GridError::MissingUniform(name));
    Ok(UniformSlots {
        view: required("u_view")?,
        projection: required("u_projection")?,
        front_color: required("u_front_color")?,
        pointer: optional("u_pointer"),
        proximity: optional("u_proximity"),
        min_size: optional("u_min_size"),
        max_size: optional("u_max_size"),
        ease_in: optional("u_ease_in"),
        ease_out: optional("u_ease_out"),
    })
}
