use std::collections::{HashMap, HashSet};

use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject, WebglLoseContext,
};

use crate::camera::Camera;
use crate::error::{Result, SceneError};
use crate::geometry::{GeometryId, LineGeometry};
use crate::scene::Scene;

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
uniform mat4 u_mvp;
void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
uniform vec4 u_color;
out vec4 frag_color;
void main() {
    frag_color = u_color;
}
"#;

struct GpuLines {
    vao: WebGlVertexArrayObject,
    vbo: WebGlBuffer,
    vertices: i32,
}

/// Draws every shape of a scene as `GL_LINES` with one flat color per
/// material. Vertex buffers are uploaded once per geometry id.
pub struct LineRenderer {
    gl: GL,
    program: WebGlProgram,
    u_mvp: WebGlUniformLocation,
    u_color: WebGlUniformLocation,
    buffers: HashMap<GeometryId, GpuLines>,
}

impl LineRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|e| SceneError::Surface(format!("{e:?}")))?
            .ok_or(SceneError::Surface("WebGL2 not supported".into()))?
            .dyn_into()
            .map_err(|_| SceneError::Surface("context is not WebGL2".into()))?;

        let vs = compile(&gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
        let fs = compile(&gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link(&gl, &vs, &fs)?;
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));

        let uniform = |name: &str| {
            gl.get_uniform_location(&program, name)
                .ok_or_else(|| SceneError::Surface(format!("uniform {name} missing")))
        };
        let u_mvp = uniform("u_mvp")?;
        let u_color = uniform("u_color")?;

        gl.enable(GL::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        Ok(Self { gl, program, u_mvp, u_color, buffers: HashMap::new() })
    }

    pub fn set_viewport(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    pub fn draw(&mut self, scene: &Scene, camera: &Camera) {
        let gl = &self.gl;
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.use_program(Some(&self.program));

        let view_projection = camera.view_projection();
        let mut seen = HashSet::with_capacity(scene.shapes().len());
        for shape in scene.shapes() {
            let Some(material) = scene.material(shape.material) else {
                continue;
            };
            let id = shape.geometry.id();
            seen.insert(id);
            if !self.buffers.contains_key(&id) {
                match upload(gl, &shape.geometry) {
                    Ok(lines) => {
                        self.buffers.insert(id, lines);
                    }
                    Err(e) => {
                        log::warn!("vertex upload failed: {e}");
                        continue;
                    }
                }
            }
            let Some(lines) = self.buffers.get(&id) else {
                continue;
            };

            let mvp = view_projection * shape.transform.matrix();
            gl.uniform_matrix4fv_with_f32_array(Some(&self.u_mvp), false, &mvp.to_cols_array());
            gl.uniform4fv_with_f32_array(Some(&self.u_color), &material.color.to_rgba());
            gl.bind_vertex_array(Some(&lines.vao));
            gl.draw_arrays(GL::LINES, 0, lines.vertices);
        }
        gl.bind_vertex_array(None);

        // Geometries that left the scene.
        let stale: Vec<GeometryId> = self.buffers.keys().filter(|id| !seen.contains(id)).copied().collect();
        for id in stale {
            if let Some(lines) = self.buffers.remove(&id) {
                delete_lines(gl, lines);
            }
        }
    }

    /// Delete every GL object and give the context back to the browser.
    pub fn release(&mut self) {
        for (_, lines) in self.buffers.drain() {
            delete_lines(&self.gl, lines);
        }
        self.gl.delete_program(Some(&self.program));
        if let Ok(Some(ext)) = self.gl.get_extension("WEBGL_lose_context") {
            if let Ok(ext) = ext.dyn_into::<WebglLoseContext>() {
                ext.lose_context();
            }
        }
    }
}

fn upload(gl: &GL, geometry: &LineGeometry) -> Result<GpuLines> {
    let vao = gl
        .create_vertex_array()
        .ok_or(SceneError::Surface("createVertexArray failed".into()))?;
    let Some(vbo) = gl.create_buffer() else {
        gl.delete_vertex_array(Some(&vao));
        return Err(SceneError::Surface("createBuffer failed".into()));
    };
    gl.bind_vertex_array(Some(&vao));
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&vbo));
    gl.buffer_data_with_u8_array(
        GL::ARRAY_BUFFER,
        bytemuck::cast_slice(geometry.positions()),
        GL::STATIC_DRAW,
    );
    gl.enable_vertex_attrib_array(0);
    gl.vertex_attrib_pointer_with_i32(0, 3, GL::FLOAT, false, 0, 0);
    gl.bind_vertex_array(None);
    gl.bind_buffer(GL::ARRAY_BUFFER, None);
    Ok(GpuLines { vao, vbo, vertices: geometry.positions().len() as i32 })
}

fn delete_lines(gl: &GL, lines: GpuLines) {
    gl.delete_buffer(Some(&lines.vbo));
    gl.delete_vertex_array(Some(&lines.vao));
}

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or(SceneError::Surface("createShader failed".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(SceneError::Surface(format!("shader compile: {log}")))
    }
}

fn link(gl: &GL, vs: &WebGlShader, fs: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or(SceneError::Surface("createProgram failed".into()))?;
    gl.attach_shader(&program, vs);
    gl.attach_shader(&program, fs);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(SceneError::Surface(format!("program link: {log}")))
    }
}
