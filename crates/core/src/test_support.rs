//! Shared fixture builders for unit tests.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tar::Builder;
use zip::write::SimpleFileOptions;

/// Write a gzip-compressed tarball containing `files` (path, content).
pub fn create_tarball(path: &Path, files: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append(&header, *content).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
}

/// Write a zip archive containing `files` (path, content).
pub fn create_zip(path: &Path, files: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().unix_permissions(0o755);

    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }

    writer.finish().unwrap();
}

/// Archive contents for a release folder holding `tools` under `bin/`.
pub fn release_files(folder: &str, tools: &[&str]) -> Vec<(String, Vec<u8>)> {
    tools
        .iter()
        .map(|tool| (format!("{folder}/bin/{tool}"), tool.as_bytes().to_vec()))
        .collect()
}

/// Borrow owned fixture entries in the shape the builders take.
pub fn as_entries(files: &[(String, Vec<u8>)]) -> Vec<(&str, &[u8])> {
    files
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_slice()))
        .collect()
}
