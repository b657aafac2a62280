//! Header import normalization for React Native iOS sources.
//!
//! Depending on whether React is linked as a static library or as a framework, the same
//! header may be pulled in as `#import "RCTBridge.h"` or `#import <React/RCTBridge.h>`.
//! Both compile to the same thing, so before hashing the quoted form of a known React header
//! is rewritten into the framework form.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{self, Read};
use std::sync::LazyLock;
use thiserror::Error;

use crate::config::{Options, Platform};

pub const REACT_FRAMEWORK: &str = "React";

/// Chunk size used when streaming files into the digest.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// React core headers whose import style varies with the link configuration.
pub const REACT_HEADERS: &[&str] = &[
    "RCTAnimationType.h",
    "RCTAppSetupUtils.h",
    "RCTAssert.h",
    "RCTBorderStyle.h",
    "RCTBridge.h",
    "RCTBridge+Private.h",
    "RCTBridgeDelegate.h",
    "RCTBridgeMethod.h",
    "RCTBridgeModule.h",
    "RCTBundleURLProvider.h",
    "RCTComponent.h",
    "RCTComponentEvent.h",
    "RCTConvert.h",
    "RCTDefines.h",
    "RCTDevLoadingViewProtocol.h",
    "RCTDevLoadingViewSetEnabled.h",
    "RCTDevMenu.h",
    "RCTDevSettings.h",
    "RCTDisplayLink.h",
    "RCTErrorInfo.h",
    "RCTEventDispatcher.h",
    "RCTEventDispatcherProtocol.h",
    "RCTEventEmitter.h",
    "RCTFont.h",
    "RCTFrameUpdate.h",
    "RCTI18nUtil.h",
    "RCTImageLoader.h",
    "RCTImageLoaderProtocol.h",
    "RCTImageSource.h",
    "RCTImageURLLoader.h",
    "RCTInvalidating.h",
    "RCTJavaScriptExecutor.h",
    "RCTJavaScriptLoader.h",
    "RCTKeyCommands.h",
    "RCTLinkingManager.h",
    "RCTLog.h",
    "RCTModuleData.h",
    "RCTModuleMethod.h",
    "RCTNetworking.h",
    "RCTPerformanceLogger.h",
    "RCTPointerEvents.h",
    "RCTReloadCommand.h",
    "RCTRootView.h",
    "RCTRootViewDelegate.h",
    "RCTScrollView.h",
    "RCTScrollableProtocol.h",
    "RCTShadowView.h",
    "RCTShadowView+Layout.h",
    "RCTSurface.h",
    "RCTSurfaceDelegate.h",
    "RCTSurfaceHostingView.h",
    "RCTTouchHandler.h",
    "RCTUIManager.h",
    "RCTUIManagerObserverCoordinator.h",
    "RCTUIManagerUtils.h",
    "RCTUIUtils.h",
    "RCTURLRequestHandler.h",
    "RCTUtils.h",
    "RCTView.h",
    "RCTViewManager.h",
    "UIView+React.h",
];

static REACT_HEADER_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| REACT_HEADERS.iter().copied().collect());

static IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(?P<indent>[ \t]*)#import[ \t]+"(?P<header>[^"\r\n]+)"(?P<trail>[ \t]*\r?)$"#)
        .unwrap()
});

static HAS_INCLUDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"__has_include\([ \t]*"(?P<header>[^"\r\n]+)"[ \t]*\)"#).unwrap()
});

/// The default set of known React headers.
pub fn react_headers() -> &'static HashSet<&'static str> {
    &REACT_HEADER_SET
}

/// A chunk the patcher could not safely rewrite. Never escapes [`patch_bytes`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("chunk is not valid UTF-8 (first invalid byte at offset {0})")]
    InvalidUtf8(usize),
}

/// Framework form of a quoted header, if the header is one we know about.
fn canonical_header(quoted: &str, headers: &HashSet<&str>) -> Option<String> {
    let name = quoted.rsplit('/').next().unwrap_or(quoted);
    if name.is_empty() || !headers.contains(name) {
        return None;
    }
    Some(format!("{REACT_FRAMEWORK}/{name}"))
}

/// Rewrite quoted imports and `__has_include` checks of known headers into framework form.
/// Unknown headers are left byte-for-byte untouched.
pub fn patch_chunk<'a>(text: &'a str, headers: &HashSet<&str>) -> Cow<'a, str> {
    let imports = IMPORT_PATTERN.replace_all(text, |caps: &Captures| {
        match canonical_header(&caps["header"], headers) {
            Some(header) => format!("{}#import <{header}>{}", &caps["indent"], &caps["trail"]),
            None => caps[0].to_string(),
        }
    });

    let includes = match HAS_INCLUDE_PATTERN.replace_all(&imports, |caps: &Captures| {
        match canonical_header(&caps["header"], headers) {
            Some(header) => format!("__has_include(<{header}>)"),
            None => caps[0].to_string(),
        }
    }) {
        Cow::Borrowed(_) => None,
        Cow::Owned(patched) => Some(patched),
    };

    match includes {
        Some(patched) => Cow::Owned(patched),
        None => imports,
    }
}

/// Patch a raw chunk. A chunk ending in a truncated UTF-8 sequence is patched up to the cut;
/// any other invalid UTF-8 is reported.
pub fn try_patch_bytes(chunk: &[u8], headers: &HashSet<&str>) -> Result<Vec<u8>, PatchError> {
    match std::str::from_utf8(chunk) {
        Ok(text) => Ok(patch_chunk(text, headers).into_owned().into_bytes()),
        Err(e) if e.error_len().is_none() => {
            let (head, tail) = chunk.split_at(e.valid_up_to());
            // valid_up_to guarantees the head is UTF-8
            let text = std::str::from_utf8(head).map_err(|_| PatchError::InvalidUtf8(0))?;
            let mut patched = patch_chunk(text, headers).into_owned().into_bytes();
            patched.extend_from_slice(tail);
            Ok(patched)
        }
        Err(e) => Err(PatchError::InvalidUtf8(e.valid_up_to())),
    }
}

/// Best-effort [`try_patch_bytes`]: falls back to the original bytes.
pub fn patch_bytes(chunk: &[u8], headers: &HashSet<&str>) -> Vec<u8> {
    try_patch_bytes(chunk, headers).unwrap_or_else(|e| {
        tracing::debug!("Header patcher skipped a chunk: {}", e);
        chunk.to_vec()
    })
}

/// Whether a file should be streamed through the patcher before hashing.
pub fn should_patch(options: &Options, file_path: &str) -> bool {
    options.enable_react_imports_patcher
        && options.has_platform(Platform::Ios)
        && is_native_ios_source(file_path)
}

/// Objective-C headers and implementation files inside an `ios/` tree, or inside a native
/// dependency under `node_modules/` that is not its Android sources.
pub fn is_native_ios_source(file_path: &str) -> bool {
    let Some((_, extension)) = file_path.rsplit_once('.') else {
        return false;
    };
    if !matches!(extension, "h" | "m" | "mm") {
        return false;
    }
    let dirs: Vec<&str> = file_path.split('/').rev().skip(1).collect();
    dirs.contains(&"ios") || (dirs.contains(&"node_modules") && !dirs.contains(&"android"))
}

/// [`Read`] decorator that passes chunks through [`patch_bytes`].
///
/// Chunks are filled to [`CHUNK_SIZE`] before patching so the output does not depend on how
/// the inner reader happens to split its reads.
pub struct PatchedReader<'h, R> {
    inner: R,
    headers: &'h HashSet<&'h str>,
    only_transform_first_chunk: bool,
    chunks_read: usize,
    buffer: Vec<u8>,
    position: usize,
    carry: Vec<u8>,
}

impl<'h, R: Read> PatchedReader<'h, R> {
    pub fn new(inner: R, headers: &'h HashSet<&'h str>) -> Self {
        Self {
            inner,
            headers,
            only_transform_first_chunk: true,
            chunks_read: 0,
            buffer: Vec::new(),
            position: 0,
            carry: Vec::new(),
        }
    }

    /// Patch every chunk instead of only the first one.
    pub fn transform_all_chunks(mut self) -> Self {
        self.only_transform_first_chunk = false;
        self
    }

    fn fill(&mut self) -> io::Result<bool> {
        let mut chunk = std::mem::take(&mut self.carry);
        let mut filled = chunk.len();
        chunk.resize(CHUNK_SIZE, 0);
        while filled < chunk.len() {
            match self.inner.read(&mut chunk[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        if filled == 0 {
            return Ok(false);
        }
        chunk.truncate(filled);

        let transform = !self.only_transform_first_chunk || self.chunks_read == 0;
        self.chunks_read += 1;
        // a character cut at a full chunk boundary is moved to the next chunk
        if transform && filled == CHUNK_SIZE {
            let cut = filled - truncated_tail_len(&chunk);
            self.carry = chunk.split_off(cut);
        }
        self.buffer = if transform {
            patch_bytes(&chunk, self.headers)
        } else {
            chunk
        };
        self.position = 0;
        Ok(true)
    }
}

/// Length of an incomplete UTF-8 sequence at the very end of `chunk`.
fn truncated_tail_len(chunk: &[u8]) -> usize {
    match std::str::from_utf8(chunk) {
        Err(e) if e.error_len().is_none() => chunk.len() - e.valid_up_to(),
        _ => 0,
    }
}

impl<R: Read> Read for PatchedReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.position >= self.buffer.len() && !self.fill()? {
            return Ok(0);
        }
        let available = &self.buffer[self.position..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.position += n;
        Ok(n)
    }
}
