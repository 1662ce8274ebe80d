//! Writes a small module tree covering every collection layout.
//!
//! ```text
//! cargo run --bin generate_sample -- [OUTPUT_DIR]
//! cargo run -- --dir sample_modules
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// (path under the root, declared dependencies)
const MODULES: &[(&str, &[&str])] = &[
    ("Core/git/2.44.0.lua", &["curl", "openssl/3.0"]),
    ("Core/git/2.45.1.lua", &["curl", "openssl/3.2"]),
    ("Core/cmake/3.28.3.lua", &[]),
    ("Bio/samtools/1.19.lua", &["htslib/1.19", "zlib"]),
    ("Bio/blast/2.15.0.lua", &[]),
    ("Compilers/gcc/12.2/boost/1.84.lua", &["zlib", "bzip2"]),
    ("Compilers/gcc/12.2/openmpi/4.1.6.lua", &["hwloc", "ucx"]),
    ("Compilers/intel/2024.0/mkl/2024.0.lua", &[]),
    ("MPI/openmpi-4.1/gcc-12/hdf5/1.14.3.lua", &["zlib", "szip"]),
    ("MPI/openmpi-4.1/gcc-12/fftw/3.3.10.lua", &[]),
    ("MPI/mvapich2-2.3/intel-2024/netcdf/4.9.2.lua", &["hdf5/1.14.3", "mvapich2"]),
    ("Python/3.11/numpy/1.26.4.lua", &["openblas"]),
    ("Python/3.11/mpi4py/3.1.5.lua", &["openmpi/4.1.6"]),
    ("Python/3.12/scipy/1.12.0.lua", &["numpy/1.26.4", "openblas"]),
];

fn module_text(name: &str, dependencies: &[&str]) -> String {
    let mut text = format!("help([[{name}]])\nwhatis(\"Name: {name}\")\n\n");
    for dep in dependencies {
        text.push_str(&format!("depends_on(\"{dep}\")\n"));
    }
    // Must not be picked up: commented out and not at line start.
    text.push_str("-- depends_on(\"disabled\")\n");
    text.push_str("prepend_path(\"PATH\", \"/opt/bin\") depends_on(\"inline\")\n");
    text
}

fn main() -> Result<()> {
    let output_dir = std::env::args().nth(1).unwrap_or_else(|| "sample_modules".to_string());
    let root = Path::new(&output_dir);

    for (rel, dependencies) in MODULES {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let name = rel.trim_end_matches(".lua");
        fs::write(&path, module_text(name, dependencies))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    fs::create_dir_all(root.join("Collections")).context("creating Collections")?;

    println!("Wrote {} module files to {output_dir}", MODULES.len());
    Ok(())
}
