//! An in-memory type catalog, usable both as the [`TypeMetadataProvider`] and the [`TypeRenderer`]
//! of a [`HeaderDumper`](crate::HeaderDumper).
//!
//! Declarations are rendered in Objective-C `@interface` style:
//!
//! ```text
//! // A note stored in the library.
//! @interface Note : NSObject <NSCopying>
//!
//! @property (nonatomic, copy) NSString *title;
//!
//! + (instancetype)noteWithTitle:(NSString *)arg0;
//! - (void)setTitle:(NSString *)arg0 notify:(BOOL)arg1;
//!
//! @end
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{
	options::RenderOptions,
	provider::{RenderError, TypeMetadataProvider, TypeRenderer},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeDescriptor {
	pub name: String,
	pub superclass: Option<String>,
	pub protocols: Vec<String>,
	pub doc_comment: Option<String>,
	pub properties: Vec<PropertyDescriptor>,
	pub methods: Vec<MethodDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDescriptor {
	pub name: String,
	#[serde(rename = "type")]
	pub type_name: String,
	/// `nonatomic`, `copy`, `readonly`...
	pub attributes: Vec<String>,
	pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MethodDescriptor {
	/// Full selector, one `:` per argument.
	pub selector: String,
	pub return_type: String,
	pub argument_types: Vec<String>,
	pub is_class_method: bool,
	pub doc_comment: Option<String>,
}

impl Default for MethodDescriptor {
	fn default() -> Self {
		Self {
			selector: String::new(),
			return_type: "void".to_string(),
			argument_types: Vec::new(),
			is_class_method: false,
			doc_comment: None,
		}
	}
}

/// Types kept in insertion order, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
	types: Vec<TypeDescriptor>,
	index: HashMap<String, usize>,
}

impl TypeCatalog {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a JSON array of type descriptors.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str::<Vec<TypeDescriptor>>(json).map(|types| types.into_iter().collect())
	}

	/// Adds a type, replacing any type already registered under the same name.
	pub fn insert(&mut self, descriptor: TypeDescriptor) {
		if let Some(&idx) = self.index.get(&descriptor.name) {
			self.types[idx] = descriptor;
		} else {
			self.index.insert(descriptor.name.clone(), self.types.len());
			self.types.push(descriptor);
		}
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
		self.index.get(name).map(|&idx| &self.types[idx])
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.types.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	fn render_declaration(
		&self,
		descriptor: &TypeDescriptor,
		options: &RenderOptions,
	) -> Result<String, RenderError> {
		let mut lines = Vec::new();

		if options.include_comments {
			push_comment(&mut lines, descriptor.doc_comment.as_deref());
		}
		lines.push(interface_line(descriptor));

		push_members(&mut lines, descriptor, options)?;

		if options.include_inherited_members {
			let mut visited = HashSet::from([descriptor.name.as_str()]);
			let mut ancestor = descriptor.superclass.as_deref();

			while let Some(ancestor_name) = ancestor {
				// Ancestors outside of the catalog end the walk
				let Some(ancestor_descriptor) = self.get(ancestor_name) else {
					break;
				};

				if !visited.insert(ancestor_name) {
					return Err(RenderError::Unsupported(format!(
						"inheritance cycle through {ancestor_name}"
					)));
				}

				if options.include_comments {
					lines.push(String::new());
					lines.push(format!("// Inherited from {ancestor_name}"));
				}
				push_members(&mut lines, ancestor_descriptor, options)?;

				ancestor = ancestor_descriptor.superclass.as_deref();
			}
		}

		lines.push(String::new());
		lines.push("@end".to_string());

		let mut declaration = lines.join("\n");
		declaration.push('\n');

		Ok(declaration)
	}
}

impl FromIterator<TypeDescriptor> for TypeCatalog {
	fn from_iter<T: IntoIterator<Item = TypeDescriptor>>(iter: T) -> Self {
		let mut catalog = Self::new();
		for descriptor in iter {
			catalog.insert(descriptor);
		}
		catalog
	}
}

impl TypeMetadataProvider for TypeCatalog {
	fn all_type_names(&self) -> Vec<String> {
		self.types.iter().map(|t| t.name.clone()).collect()
	}
}

impl TypeRenderer for TypeCatalog {
	fn render(&self, type_name: &str, options: &RenderOptions) -> Result<String, RenderError> {
		let descriptor = self.get(type_name).ok_or(RenderError::NotFound)?;

		self.render_declaration(descriptor, options)
	}
}

fn interface_line(descriptor: &TypeDescriptor) -> String {
	let mut line = format!("@interface {}", descriptor.name);

	if let Some(superclass) = &descriptor.superclass {
		line.push_str(" : ");
		line.push_str(superclass);
	}

	if !descriptor.protocols.is_empty() {
		line.push_str(" <");
		line.push_str(&descriptor.protocols.join(", "));
		line.push('>');
	}

	line
}

fn push_comment(lines: &mut Vec<String>, doc_comment: Option<&str>) {
	if let Some(doc_comment) = doc_comment {
		lines.extend(doc_comment.lines().map(|line| format!("// {line}").trim_end().to_string()));
	}
}

fn push_members(
	lines: &mut Vec<String>,
	descriptor: &TypeDescriptor,
	options: &RenderOptions,
) -> Result<(), RenderError> {
	if !descriptor.properties.is_empty() {
		lines.push(String::new());
		for property in &descriptor.properties {
			if options.include_comments {
				push_comment(lines, property.doc_comment.as_deref());
			}
			lines.push(property_line(property)?);
		}
	}

	if !descriptor.methods.is_empty() {
		lines.push(String::new());
		for method in &descriptor.methods {
			if options.include_comments {
				push_comment(lines, method.doc_comment.as_deref());
			}
			lines.push(method_line(method)?);
		}
	}

	Ok(())
}

fn property_line(property: &PropertyDescriptor) -> Result<String, RenderError> {
	if property.name.is_empty() || property.type_name.trim().is_empty() {
		return Err(RenderError::Unsupported(format!(
			"property `{}` has no name or type",
			property.name
		)));
	}

	let attributes = if property.attributes.is_empty() {
		String::new()
	} else {
		format!(" ({})", property.attributes.join(", "))
	};

	Ok(format!(
		"@property{attributes} {};",
		typed_name(&property.type_name, &property.name)
	))
}

fn method_line(method: &MethodDescriptor) -> Result<String, RenderError> {
	let prefix = if method.is_class_method { '+' } else { '-' };
	let arity = method.selector.matches(':').count();

	if method.selector.is_empty() || arity != method.argument_types.len() {
		return Err(RenderError::Unsupported(format!(
			"selector `{}` takes {arity} arguments but {} were described",
			method.selector,
			method.argument_types.len()
		)));
	}

	let signature = if arity == 0 {
		method.selector.clone()
	} else {
		method
			.selector
			.split_terminator(':')
			.zip(&method.argument_types)
			.enumerate()
			.map(|(idx, (part, arg_type))| format!("{part}:({})arg{idx}", arg_type.trim()))
			.collect::<Vec<_>>()
			.join(" ")
	};

	Ok(format!("{prefix} ({}){signature};", method.return_type.trim()))
}

/// `NSString *` and `title` give `NSString *title`, `BOOL` and `done` give `BOOL done`.
fn typed_name(type_name: &str, name: &str) -> String {
	let type_name = type_name.trim();

	if type_name.ends_with('*') {
		format!("{type_name}{name}")
	} else {
		format!("{type_name} {name}")
	}
}
