#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

pub fn write_label(root: &Path, stem: &str, class_id: usize) {
    let path = root.join("labels").join(format!("{stem}.txt"));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create labels dir");
    }
    fs::write(path, format!("{class_id} 0.5 0.5 0.25 0.25\n")).expect("write label file");
}

/// Create `<parent>/<name>` with `n` paired images `img0.bmp..img{n-1}.bmp`.
///
/// Each image gets a distinct width so copies can be told apart by content.
pub fn create_dataset(parent: &Path, name: &str, n: usize) -> PathBuf {
    let root = parent.join(name);
    fs::create_dir_all(root.join("images")).expect("create images dir");
    fs::create_dir_all(root.join("labels")).expect("create labels dir");

    for i in 0..n {
        write_bmp(
            &root.join("images").join(format!("img{i}.bmp")),
            i as u32 + 1,
            2,
        );
        write_label(&root, &format!("img{i}"), i % 3);
    }

    root
}

/// File names directly inside `dir`, sorted.
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Strip extension: `img3.bmp` -> `img3`.
pub fn stems(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| {
            Path::new(name)
                .file_stem()
                .expect("file stem")
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}
