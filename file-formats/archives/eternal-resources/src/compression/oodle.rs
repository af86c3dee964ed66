//! Oodle runtime binding

#![allow(unsafe_code)]

use super::Codec;
use crate::error::{Error, Result};
use libloading::Library;
use std::ffi::c_void;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable that overrides library discovery
pub const OODLE_ENV_VAR: &str = "ETERNAL_OODLE_PATH";

/// Windows runtime shipped in the game directory
const WINDOWS_LIBRARY: &str = "oo2core_8_win64.dll";
/// linoodle shim placed next to the archives
const LINOODLE_LIBRARY: &str = "liblinoodle.so";
/// Native Linux runtime
const LINUX_LIBRARY: &str = "liboo2corelinux64.so.9";

/// Slack the decoder may write past the end of its output
const DECOMPRESS_PADDING: usize = 64;
/// Worst-case expansion headroom for incompressible input
const COMPRESS_HEADROOM: usize = 65536;

type DecompressFn = unsafe extern "C" fn(
    src: *const u8,
    src_len: isize,
    dst: *mut u8,
    dst_len: isize,
    fuzz_safe: i32,
    check_crc: i32,
    verbosity: i32,
    dec_buf_base: *mut u8,
    dec_buf_size: isize,
    callback: *mut c_void,
    callback_data: *mut c_void,
    decoder_memory: *mut c_void,
    decoder_memory_size: isize,
    thread_phase: i32,
) -> isize;

type CompressFn = unsafe extern "C" fn(
    compressor: i32,
    src: *const u8,
    src_len: isize,
    dst: *mut u8,
    level: i32,
    options: *const c_void,
    dictionary_base: *const c_void,
    lrm: *const c_void,
    scratch: *mut c_void,
    scratch_size: isize,
) -> isize;

/// Oodle compressor ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OodleCompressor {
    /// Kraken, used for all game data
    Kraken = 8,
}

/// Oodle compression levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OodleLevel {
    /// Fast level
    Fast = 3,
    /// Normal level
    Normal = 4,
    /// Optimal level
    Optimal1 = 5,
}

/// Oodle library loaded from disk
pub struct Oodle {
    path: PathBuf,
    compressor: OodleCompressor,
    level: OodleLevel,
    decompress_fn: DecompressFn,
    compress_fn: CompressFn,
    // Keeps the function pointers above valid.
    _library: Library,
}

impl fmt::Debug for Oodle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Oodle")
            .field("path", &self.path)
            .field("compressor", &self.compressor)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl Oodle {
    /// Load the library at an explicit path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::CodecUnavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }

        // SAFETY: loading runs the library initializers; the Oodle runtime has
        // none with observable side effects.
        let library = unsafe { Library::new(path) }
            .map_err(|e| Error::CodecUnavailable(format!("{}: {e}", path.display())))?;

        // SAFETY: the signatures match the exported Oodle 2.8 ABI.
        let (decompress_fn, compress_fn) = unsafe {
            let decompress = library
                .get::<DecompressFn>(b"OodleLZ_Decompress\0")
                .map_err(|e| Error::CodecUnavailable(format!("OodleLZ_Decompress: {e}")))?;
            let compress = library
                .get::<CompressFn>(b"OodleLZ_Compress\0")
                .map_err(|e| Error::CodecUnavailable(format!("OodleLZ_Compress: {e}")))?;
            (*decompress, *compress)
        };

        log::info!("Loaded Oodle from {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            compressor: OodleCompressor::Kraken,
            level: OodleLevel::Normal,
            decompress_fn,
            compress_fn,
            _library: library,
        })
    }

    /// Locate the library for a game install
    ///
    /// `base_dir` is the game's `base` directory. [`OODLE_ENV_VAR`] wins over
    /// the platform candidates.
    pub fn locate(base_dir: &Path) -> Result<Self> {
        if let Some(path) = std::env::var_os(OODLE_ENV_VAR) {
            return Self::load(PathBuf::from(path));
        }

        let candidates = Self::candidate_paths(base_dir);
        for candidate in &candidates {
            if candidate.is_file() {
                return Self::load(candidate);
            }
            log::debug!("No Oodle library at {}", candidate.display());
        }

        Err(Error::CodecUnavailable(format!(
            "none of {} found",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Platform search order for [`Oodle::locate`]
    pub fn candidate_paths(base_dir: &Path) -> Vec<PathBuf> {
        let game_dir = base_dir.parent().unwrap_or(base_dir);

        if cfg!(windows) {
            vec![game_dir.join(WINDOWS_LIBRARY)]
        } else {
            vec![
                base_dir.join(LINOODLE_LIBRARY),
                game_dir.join(LINUX_LIBRARY),
            ]
        }
    }

    /// Change the compression level
    pub fn with_level(mut self, level: OodleLevel) -> Self {
        self.level = level;
        self
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Codec for Oodle {
    fn name(&self) -> &str {
        "oodle"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let src_len = isize::try_from(data.len())
            .map_err(|_| Error::compression("input too large"))?;
        let mut out = vec![0u8; data.len() + COMPRESS_HEADROOM];

        // SAFETY: `out` has room for the worst-case expansion of `data`.
        let written = unsafe {
            (self.compress_fn)(
                self.compressor as i32,
                data.as_ptr(),
                src_len,
                out.as_mut_ptr(),
                self.level as i32,
                std::ptr::null(),
                std::ptr::null(),
                std::ptr::null(),
                std::ptr::null_mut(),
                0,
            )
        };

        let written = usize::try_from(written)
            .ok()
            .filter(|&n| n > 0 && n <= out.len())
            .ok_or_else(|| Error::compression(format!("OodleLZ_Compress returned {written}")))?;
        out.truncate(written);

        log::debug!("Compressed {} -> {} bytes", data.len(), written);
        Ok(out)
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        let src_len = isize::try_from(data.len())
            .map_err(|_| Error::decompression("input too large"))?;
        let dst_len = isize::try_from(expected_size)
            .map_err(|_| Error::decompression("output too large"))?;
        let mut out = vec![0u8; expected_size + DECOMPRESS_PADDING];

        // SAFETY: `out` is at least `expected_size` bytes plus decoder slack.
        let written = unsafe {
            (self.decompress_fn)(
                data.as_ptr(),
                src_len,
                out.as_mut_ptr(),
                dst_len,
                1,
                0,
                0,
                std::ptr::null_mut(),
                0,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                0,
                3,
            )
        };

        if written <= 0 {
            return Err(Error::decompression(format!(
                "OodleLZ_Decompress returned {written}"
            )));
        }
        if written as usize != expected_size {
            return Err(Error::SizeMismatch {
                expected: expected_size as u64,
                actual: written as u64,
            });
        }

        out.truncate(expected_size);
        Ok(out)
    }
}
