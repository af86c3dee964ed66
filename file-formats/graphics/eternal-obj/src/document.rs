//! Line classification and object grouping

use crate::error::Result;
use std::fmt;
use std::io::Write;
use std::ops::Range;
use std::path::Path;

/// Name of the group created when a file has no `o` lines
pub const DEFAULT_GROUP_NAME: &str = "Default";

/// Kind of a retained OBJ line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// `# ...`
    Comment,
    /// `mtllib ...`
    MaterialLibrary,
    /// `o ...`
    Object,
    /// `v x y z`
    Vertex,
    /// `vt u v`
    TexCoord,
    /// `vn x y z`
    Normal,
    /// `f a b c`
    Face,
    /// `g ...`
    Group,
    /// `usemtl ...`
    UseMaterial,
}

impl LineKind {
    /// Keyword that introduces this kind of line
    pub fn keyword(self) -> &'static str {
        match self {
            LineKind::Comment => "#",
            LineKind::MaterialLibrary => "mtllib",
            LineKind::Object => "o",
            LineKind::Vertex => "v",
            LineKind::TexCoord => "vt",
            LineKind::Normal => "vn",
            LineKind::Face => "f",
            LineKind::Group => "g",
            LineKind::UseMaterial => "usemtl",
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Classify a raw line
///
/// Returns `None` for lines that are dropped: blank lines, lines without a
/// space, smoothing groups (`s`) and any keyword not listed in [`LineKind`].
pub fn classify(line: &str) -> Option<LineKind> {
    if line.len() <= 1 {
        return None;
    }

    let (keyword, _) = line.split_once(' ')?;
    match keyword {
        "#" => Some(LineKind::Comment),
        "mtllib" => Some(LineKind::MaterialLibrary),
        "o" => Some(LineKind::Object),
        "v" => Some(LineKind::Vertex),
        "vt" => Some(LineKind::TexCoord),
        "vn" => Some(LineKind::Normal),
        "f" => Some(LineKind::Face),
        "g" => Some(LineKind::Group),
        "usemtl" => Some(LineKind::UseMaterial),
        _ => None,
    }
}

/// A retained line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjLine {
    /// Classified kind
    pub kind: LineKind,
    /// Raw text without line terminator
    pub text: String,
}

/// Attribute lines owned by one object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjGroup {
    /// Object name (text after `o `), or [`DEFAULT_GROUP_NAME`]
    pub name: String,
    /// Range of [`ObjDocument::lines`] the group owns
    pub lines: Range<usize>,
    /// `v` lines
    pub vertices: Vec<String>,
    /// `vt` lines
    pub uvs: Vec<String>,
    /// `vn` lines
    pub normals: Vec<String>,
    /// `f` lines
    pub faces: Vec<String>,
    /// Last `g` line seen in the group
    pub group_line: Option<String>,
    /// Last `usemtl` line seen in the group
    pub material_line: Option<String>,
}

impl ObjGroup {
    fn new(name: String, lines: Range<usize>) -> Self {
        Self {
            name,
            lines,
            ..Default::default()
        }
    }

    fn push(&mut self, line: &ObjLine) {
        let text = line.text.clone();
        match line.kind {
            LineKind::Vertex => self.vertices.push(text),
            LineKind::TexCoord => self.uvs.push(text),
            LineKind::Normal => self.normals.push(text),
            LineKind::Face => self.faces.push(text),
            LineKind::UseMaterial => self.material_line = Some(text),
            LineKind::Group => self.group_line = Some(text),
            _ => {}
        }
    }
}

/// A parsed OBJ file
///
/// Numeric content is kept as text; see [`crate::attributes`] for
/// interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjDocument {
    lines: Vec<ObjLine>,
    groups: Vec<ObjGroup>,
}

impl ObjDocument {
    /// Parse OBJ text
    pub fn parse(text: &str) -> Self {
        let lines: Vec<ObjLine> = text
            .lines()
            .filter_map(|raw| {
                let raw = raw.strip_suffix('\r').unwrap_or(raw);
                classify(raw).map(|kind| ObjLine {
                    kind,
                    text: raw.to_string(),
                })
            })
            .collect();

        let object_starts: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.kind == LineKind::Object)
            .map(|(i, _)| i)
            .collect();

        let mut groups: Vec<ObjGroup> = if object_starts.is_empty() {
            vec![ObjGroup::new(DEFAULT_GROUP_NAME.to_string(), 0..lines.len())]
        } else {
            object_starts
                .iter()
                .enumerate()
                .map(|(n, &start)| {
                    let end = object_starts.get(n + 1).copied().unwrap_or(lines.len());
                    let name = lines[start].text.get(2..).unwrap_or_default().to_string();
                    ObjGroup::new(name, start + 1..end)
                })
                .collect()
        };

        for group in &mut groups {
            for line in &lines[group.lines.clone()] {
                group.push(line);
            }
        }

        log::debug!(
            "Parsed OBJ: {} retained lines in {} group(s)",
            lines.len(),
            groups.len()
        );

        Self { lines, groups }
    }

    /// Read and parse a file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Retained lines in file order
    pub fn lines(&self) -> &[ObjLine] {
        &self.lines
    }

    /// Object groups in file order
    pub fn groups(&self) -> &[ObjGroup] {
        &self.groups
    }

    /// Group names in file order
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    /// All lines of one kind across every group, in file order
    pub fn lines_of(&self, kind: LineKind) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(move |g| g.lines.clone())
            .map(|i| &self.lines[i])
            .filter(move |l| l.kind == kind)
            .map(|l| l.text.as_str())
    }

    /// Write the retained lines
    ///
    /// The output holds no smoothing groups or unknown statements, which the
    /// reindexing step cannot handle.
    pub fn write_sanitized<W: Write>(&self, writer: &mut W) -> Result<()> {
        for line in &self.lines {
            writeln!(writer, "{}", line.text)?;
        }
        Ok(())
    }

    /// Write the retained lines to a file
    pub fn save_sanitized<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path.as_ref())?);
        self.write_sanitized(&mut file)?;
        file.flush()?;
        Ok(())
    }
}
