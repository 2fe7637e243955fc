use serde_json::Value;

use crate::path::path_model::ConfigPath;

/// Value types a field may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Int,
    Float,
    Str,
    Bool,
    Path,
    PathDir,
    List,
    Array,
    Dict,
    Enum,
}

impl Dtype {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Dtype::Int),
            "float" => Some(Dtype::Float),
            "str" => Some(Dtype::Str),
            "bool" => Some(Dtype::Bool),
            "path" => Some(Dtype::Path),
            "path-dir" => Some(Dtype::PathDir),
            "list" => Some(Dtype::List),
            "array" => Some(Dtype::Array),
            "dict" => Some(Dtype::Dict),
            "enum" => Some(Dtype::Enum),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dtype::Int => "int",
            Dtype::Float => "float",
            Dtype::Str => "str",
            Dtype::Bool => "bool",
            Dtype::Path => "path",
            Dtype::PathDir => "path-dir",
            Dtype::List => "list",
            Dtype::Array => "array",
            Dtype::Dict => "dict",
            Dtype::Enum => "enum",
        }
    }
}

/// Declared type of a field: one dtype, or several tried in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DtypeSpec {
    /// No dtype given; only valid together with `allowed_values`
    Unspecified,
    One(Dtype),
    AnyOf(Vec<Dtype>),
}

impl DtypeSpec {
    pub fn candidates(&self) -> Vec<Dtype> {
        match self {
            DtypeSpec::Unspecified => vec![Dtype::Str],
            DtypeSpec::One(d) => vec![*d],
            DtypeSpec::AnyOf(ds) => ds.clone(),
        }
    }

    pub fn is(&self, dtype: Dtype) -> bool {
        matches!(self, DtypeSpec::One(d) if *d == dtype)
    }
}

/// Visibility rule: show the element only while `trigger` currently reads `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub trigger: ConfigPath,
    pub expected: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub label: String,
    pub description: Option<String>,
    pub dtype: DtypeSpec,
    pub subdtype: Option<Dtype>,
    pub default: Option<Value>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allowed_values: Option<Vec<Value>>,
    pub length: Option<usize>,
    pub sublabels: Option<Vec<String>>,
    pub depends_on: Option<Dependency>,
    /// Free-form role tag (e.g. `input` marks paths that must exist)
    pub role: Option<String>,
    /// Null or blank values are dropped instead of validated
    pub blank: bool,
    /// Empty text is kept instead of dropped
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub label: String,
    pub description: Option<String>,
    pub depends_on: Option<Dependency>,
    pub children: Vec<(String, SchemaNode)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Group(GroupSpec),
    OptionalGroup(GroupSpec),
    Field(FieldSpec),
}

impl SchemaNode {
    pub fn label(&self) -> &str {
        match self {
            SchemaNode::Group(g) | SchemaNode::OptionalGroup(g) => &g.label,
            SchemaNode::Field(f) => &f.label,
        }
    }

    pub fn depends_on(&self) -> Option<&Dependency> {
        match self {
            SchemaNode::Group(g) | SchemaNode::OptionalGroup(g) => g.depends_on.as_ref(),
            SchemaNode::Field(f) => f.depends_on.as_ref(),
        }
    }

    pub fn children(&self) -> &[(String, SchemaNode)] {
        match self {
            SchemaNode::Group(g) | SchemaNode::OptionalGroup(g) => &g.children,
            SchemaNode::Field(_) => &[],
        }
    }
}

/// A parsed, validated schema. The root is an unlabeled group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub children: Vec<(String, SchemaNode)>,
}

impl Schema {
    /// Resolve a path to its node. The root has no node of its own.
    pub fn find(&self, path: &ConfigPath) -> Option<&SchemaNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = lookup(&self.children, first)?;
        for segment in rest {
            node = lookup(node.children(), segment)?;
        }
        Some(node)
    }

    pub fn field(&self, path: &ConfigPath) -> Option<&FieldSpec> {
        match self.find(path)? {
            SchemaNode::Field(f) => Some(f),
            _ => None,
        }
    }

    /// Pre-order visit of every node with its path and nesting level (top level is 1).
    pub fn visit<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(&ConfigPath, &'a SchemaNode, usize),
    {
        visit_children(&self.children, &ConfigPath::root(), 1, &mut visitor);
    }

    pub fn field_paths(&self) -> Vec<ConfigPath> {
        let mut out = Vec::new();
        self.visit(|path, node, _| {
            if matches!(node, SchemaNode::Field(_)) {
                out.push(path.clone());
            }
        });
        out
    }
}

fn lookup<'a>(children: &'a [(String, SchemaNode)], key: &str) -> Option<&'a SchemaNode> {
    children.iter().find(|(k, _)| k == key).map(|(_, n)| n)
}

fn visit_children<'a, F>(
    children: &'a [(String, SchemaNode)],
    parent: &ConfigPath,
    level: usize,
    visitor: &mut F,
) where
    F: FnMut(&ConfigPath, &'a SchemaNode, usize),
{
    for (key, node) in children {
        let path = parent.child(key);
        visitor(&path, node, level);
        visit_children(node.children(), &path, level + 1, visitor);
    }
}
