//! Dispatch tables: which table fields, methods and functions name resources,
//! what shape their value must have, and how the found strings are rewritten.

use std::sync::LazyLock;

use hashbrown::HashMap;

const SEX_PLACEHOLDER: &str = "$sex";

/// Expected shape of the value a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A string literal, possibly parenthesized.
    Single,
    /// A table constructor; every string-valued field contributes.
    Multi,
    SingleOrMulti,
    /// A string literal whose contents are a script of their own.
    EmbeddedScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    FbxToAnimation,
    FbxToModel,
    TgaToDds,
    /// Replaces each string containing `$sex` with a `male` and a `female` variant.
    ExpandSex,
}

impl Transform {
    pub fn apply(self, values: Vec<String>) -> Vec<String> {
        match self {
            Self::FbxToAnimation => remap_extension(values, ".fbx", ".animation"),
            Self::FbxToModel => remap_extension(values, ".fbx", ".model"),
            Self::TgaToDds => remap_extension(values, ".tga", ".dds"),
            Self::ExpandSex => values
                .into_iter()
                .flat_map(|value| {
                    if value.contains(SEX_PLACEHOLDER) {
                        vec![
                            value.replace(SEX_PLACEHOLDER, "male"),
                            value.replace(SEX_PLACEHOLDER, "female"),
                        ]
                    } else {
                        vec![value]
                    }
                })
                .collect(),
        }
    }
}

fn remap_extension(values: Vec<String>, from: &str, to: &str) -> Vec<String> {
    values
        .into_iter()
        .map(|value| match value.strip_suffix(from) {
            Some(stem) => format!("{stem}{to}"),
            None => value,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub shape: Shape,
    /// Applied in order.
    pub transforms: &'static [Transform],
}

impl Rule {
    const fn new(shape: Shape, transforms: &'static [Transform]) -> Self {
        Self { shape, transforms }
    }

    pub fn transform(&self, values: Vec<String>) -> Vec<String> {
        self.transforms
            .iter()
            .fold(values, |values, transform| transform.apply(values))
    }
}

const STRING: Rule = Rule::new(Shape::Single, &[]);
const TEXTURE: Rule = Rule::new(Shape::Single, &[Transform::TgaToDds]);
const MODEL: Rule = Rule::new(Shape::Single, &[Transform::FbxToModel]);
const ANIMATION: Rule = Rule::new(Shape::Single, &[Transform::FbxToAnimation]);
const SCRIPT: Rule = Rule::new(Shape::EmbeddedScript, &[]);

static TABLE_FIELD_RULES: LazyLock<HashMap<&'static str, Rule>> = LazyLock::new(|| {
    HashMap::from_iter([
        ("animation", ANIMATION),
        (
            "animations",
            Rule::new(Shape::Multi, &[Transform::FbxToAnimation]),
        ),
        ("model", MODEL),
        ("emitterMesh", MODEL),
        ("gfxAtlas", TEXTURE),
        ("diffuseMap", TEXTURE),
        ("specularMap", TEXTURE),
        ("normalMap", TEXTURE),
        ("emissiveMap", TEXTURE),
        ("displacementMap", TEXTURE),
        ("iconAtlas", TEXTURE),
        ("texture", TEXTURE),
        ("spellIconAtlas", TEXTURE),
        ("image", TEXTURE),
        ("portrait", TEXTURE),
        ("shadeTex", TEXTURE),
        (
            "inventoryBackground",
            Rule::new(Shape::Single, &[Transform::ExpandSex, Transform::TgaToDds]),
        ),
        ("clouds0Map", TEXTURE),
        ("clouds1Map", TEXTURE),
        ("clouds2Map", TEXTURE),
        ("clouds3Map", TEXTURE),
        ("cloudsRim1Map", TEXTURE),
        ("cloudsRim2Map", TEXTURE),
        ("cloudsRim3Map", TEXTURE),
        ("ScrollImage", STRING),
        ("filename", Rule::new(Shape::SingleOrMulti, &[])),
        ("source", SCRIPT),
    ])
});

/// Rules for `receiver:name(...)`, applied to the first argument.
static METHOD_RULES: LazyLock<HashMap<&'static str, Rule>> = LazyLock::new(|| {
    HashMap::from_iter([
        ("setModel", MODEL),
        ("setGfxAtlas", TEXTURE),
        ("setTexture", TEXTURE),
        ("setImage", TEXTURE),
        ("setPortrait", TEXTURE),
        ("setEmitterMesh", MODEL),
        ("playScreenEffect", STRING),
        ("loadFile", STRING),
        ("setSource", SCRIPT),
    ])
});

/// Rules for `name(...)` and `a.b.name(...)`, applied to the first argument.
static FUNCTION_RULES: LazyLock<HashMap<&'static str, Rule>> = LazyLock::new(|| {
    HashMap::from_iter([
        ("drawImage", TEXTURE),
        ("showImage", TEXTURE),
        ("import", STRING),
        ("completeGame", STRING),
        ("playVideo", STRING),
    ])
});

pub fn table_field_rule(name: &str) -> Option<&'static Rule> {
    TABLE_FIELD_RULES.get(name)
}

pub fn method_rule(name: &str) -> Option<&'static Rule> {
    METHOD_RULES.get(name)
}

pub fn function_rule(name: &str) -> Option<&'static Rule> {
    FUNCTION_RULES.get(name)
}
