//! Classpath model
//!
//! Class, method and field metadata as supplied by the external classpath
//! provider, plus the in-memory provider used by the CLI and tests.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ir::{RawInst, TypeName};

/// Name of a constructor method
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Name of a static initializer method
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub type_name: TypeName,
    #[serde(default)]
    pub is_static: bool,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<TypeName>, is_static: bool) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_static,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: TypeName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeName,
    /// Number of local-variable slots used by the body
    pub local_count: u32,
    /// `None` for abstract and native methods
    pub instructions: Option<Vec<RawInst>>,
}

impl MethodInfo {
    pub fn descriptor(&self) -> String {
        let args: String = self
            .parameters
            .iter()
            .map(|p| p.type_name.descriptor())
            .collect();
        format!("({}){}", args, self.return_type.descriptor())
    }

    /// Canonical ordering key (`name` + JVM descriptor)
    pub fn description(&self) -> String {
        format!("{}{}", self.name, self.descriptor())
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    pub fn is_class_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER_NAME
    }

    pub fn has_signature(&self, name: &str, descriptor: &str) -> bool {
        self.name == name && self.descriptor() == descriptor
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: TypeName,
    #[serde(default)]
    pub super_class: Option<TypeName>,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.has_signature(name, descriptor))
    }

    pub fn declared_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Superclass of well-known runtime classes that are never on the classpath
pub fn builtin_superclass(name: &str) -> Option<&'static str> {
    match name {
        "java.lang.Object" => None,
        "java.lang.Throwable" => Some("java.lang.Object"),
        "java.lang.Exception" | "java.lang.Error" => Some("java.lang.Throwable"),
        "java.lang.RuntimeException" => Some("java.lang.Exception"),
        "java.lang.ArithmeticException"
        | "java.lang.NullPointerException"
        | "java.lang.ClassCastException"
        | "java.lang.IllegalArgumentException"
        | "java.lang.IllegalStateException"
        | "java.lang.NegativeArraySizeException"
        | "java.lang.IndexOutOfBoundsException" => Some("java.lang.RuntimeException"),
        "java.lang.ArrayIndexOutOfBoundsException" => Some("java.lang.IndexOutOfBoundsException"),
        _ => Some("java.lang.Object"),
    }
}

/// Read-only class lookup
pub trait Classpath: Send + Sync {
    fn find_class(&self, name: &str) -> Option<&ClassInfo>;

    /// Superclass name, consulting builtin runtime classes when the class is
    /// not on the classpath
    fn super_class_of(&self, name: &str) -> Option<TypeName> {
        match self.find_class(name) {
            Some(class) => class.super_class.clone(),
            None => builtin_superclass(name).map(TypeName::new),
        }
    }

    /// `name` itself followed by its superclasses up to the root
    fn superclass_chain(&self, name: &str) -> Vec<TypeName> {
        let mut chain = vec![TypeName::new(name)];
        let mut current = self.super_class_of(name);
        while let Some(class) = current {
            if chain.contains(&class) {
                break;
            }
            current = self.super_class_of(class.as_str());
            chain.push(class);
        }
        chain
    }

    fn is_subclass_of(&self, name: &str, ancestor: &str) -> bool {
        self.superclass_chain(name)
            .iter()
            .any(|class| class.as_str() == ancestor)
    }
}

/// Classpath held fully in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryClasspath {
    classes: Vec<ClassInfo>,
    index: FxHashMap<String, usize>,
}

impl InMemoryClasspath {
    pub fn new(classes: Vec<ClassInfo>) -> Self {
        let mut classpath = Self {
            classes: Vec::new(),
            index: FxHashMap::default(),
        };
        for class in classes {
            classpath.insert(class);
        }
        classpath
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let classes: Vec<ClassInfo> = serde_json::from_str(json)?;
        Ok(Self::new(classes))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.classes)
    }

    /// Insert or replace a class
    pub fn insert(&mut self, class: ClassInfo) {
        match self.index.get(class.name.as_str()) {
            Some(&slot) => self.classes[slot] = class,
            None => {
                self.index
                    .insert(class.name.as_str().to_string(), self.classes.len());
                self.classes.push(class);
            }
        }
    }

    pub fn classes(&self) -> &[ClassInfo] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Classpath for InMemoryClasspath {
    fn find_class(&self, name: &str) -> Option<&ClassInfo> {
        self.index.get(name).map(|&slot| &self.classes[slot])
    }
}
