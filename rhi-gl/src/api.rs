//! Generated OpenGL 4.5 core bindings (`gl_generator`, `build.rs`).
#![allow(clippy::all)]
#![allow(non_upper_case_globals, non_snake_case, non_camel_case_types, dead_code)]

include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
