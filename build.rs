const STACK_BUFFER_BYTES_ENV: &str = "HANDLE_KIT_STACK_BUFFER_BYTES";
const DEFAULT_STACK_BUFFER_BYTES: usize = 1024;

fn main() {
    println!("cargo:rerun-if-env-changed={STACK_BUFFER_BYTES_ENV}");
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = std::path::PathBuf::from(std::env::var_os("OUT_DIR").expect("no OUT_DIR"));

    let stack_buffer_bytes = match std::env::var(STACK_BUFFER_BYTES_ENV) {
        Ok(v) => match v.trim().parse::<usize>() {
            // must split evenly into u16 and u32 units
            Ok(n) if n > 0 && n % 4 == 0 => n,
            _ => panic!("{STACK_BUFFER_BYTES_ENV} must be a positive multiple of 4 (got {v:?})"),
        },
        Err(_) => DEFAULT_STACK_BUFFER_BYTES,
    };

    std::fs::write(
        out_dir.join("stack_buffer.rs"),
        format!(
            "/// Size of the stack buffer tried before any heap allocation, in bytes.\n\
             pub const STACK_BUFFER_BYTES: usize = {stack_buffer_bytes};\n"
        ),
    )
    .expect("failed to write stack_buffer.rs");
}
