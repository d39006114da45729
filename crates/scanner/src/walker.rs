//! 스캔 대상 탐색기
//!
//! 루트 경로에서 일반 파일을 깊이 우선(전위) 순서로 지연 생성합니다.
//!
//! - 루트가 일반 파일이면 그 파일 하나만 나옵니다.
//! - 디렉토리는 재귀하고, 같은 디렉토리 안에서는 이름순입니다.
//! - 소켓, 장치, 깨진 링크, 디렉토리를 가리키는 심볼릭 링크는 조용히 건너뜁니다.
//! - 루트가 파일도 디렉토리도 아니면 아무것도 나오지 않습니다.
//!
//! 재귀 대신 명시적 스택을 쓰며, 깊이 제한과 정규화 경로 기반 순환 방지를 둡니다.
//! 한 번 소진되면 다시 시작할 수 없습니다.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// 깊이 우선 대상 탐색기
pub struct TargetWalker {
    root_file: Option<PathBuf>,
    stack: Vec<(std::vec::IntoIter<PathBuf>, usize)>,
    visited: HashSet<PathBuf>,
    max_depth: usize,
    skipped: usize,
}

impl TargetWalker {
    /// 루트 경로에서 탐색기를 만듭니다.
    ///
    /// `max_depth`는 루트 디렉토리를 깊이 1로 세었을 때 내려갈 수 있는 최대 깊이입니다.
    pub fn new(root: &Path, max_depth: usize) -> Self {
        let mut walker = Self {
            root_file: None,
            stack: Vec::new(),
            visited: HashSet::new(),
            max_depth: max_depth.max(1),
            skipped: 0,
        };

        match fs::metadata(root) {
            Ok(m) if m.is_file() => walker.root_file = Some(root.to_path_buf()),
            Ok(m) if m.is_dir() => walker.descend(root, 1),
            Ok(_) => debug!(root = %root.display(), "root is neither a file nor a directory"),
            Err(e) => debug!(root = %root.display(), error = %e, "root is not accessible"),
        }
        walker
    }

    /// 건너뛴 항목 수 (특수 파일, 읽을 수 없는 디렉토리, 깊이 초과 등)
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn descend(&mut self, dir: &Path, depth: usize) {
        if depth > self.max_depth {
            debug!(dir = %dir.display(), max_depth = self.max_depth, "max depth reached, not descending");
            self.skipped += 1;
            return;
        }

        if let Ok(canonical) = fs::canonicalize(dir) {
            if !self.visited.insert(canonical) {
                debug!(dir = %dir.display(), "directory already visited, skipping");
                self.skipped += 1;
                return;
            }
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "failed to read directory");
                self.skipped += 1;
                return;
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(e) => paths.push(e.path()),
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "failed to read directory entry");
                    self.skipped += 1;
                }
            }
        }
        paths.sort();
        self.stack.push((paths.into_iter(), depth));
    }
}

impl Iterator for TargetWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        if let Some(file) = self.root_file.take() {
            return Some(file);
        }

        loop {
            let (entries, depth) = self.stack.last_mut()?;
            let depth = *depth;
            let Some(path) = entries.next() else {
                self.stack.pop();
                continue;
            };

            // 디렉토리 판단은 링크를 따라가지 않음
            let is_dir = fs::symlink_metadata(&path)
                .map(|m| m.file_type().is_dir())
                .unwrap_or(false);
            if is_dir {
                self.descend(&path, depth + 1);
                continue;
            }

            // 일반 파일 판단은 링크를 따라감
            match fs::metadata(&path) {
                Ok(m) if m.is_file() => return Some(path),
                Ok(_) => {
                    debug!(path = %path.display(), "not a regular file, skipping");
                    self.skipped += 1;
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "unreadable entry, skipping");
                    self.skipped += 1;
                }
            }
        }
    }
}
