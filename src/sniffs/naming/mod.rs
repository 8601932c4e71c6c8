//! The naming rule family.

mod abstract_class_name;
mod class_name_suffix_by_parent;
mod interface_name;
mod trait_name;

pub use abstract_class_name::AbstractClassNameSniff;
pub use class_name_suffix_by_parent::{ClassNameSuffixByParentSniff, SuffixByParentConfig};
pub use interface_name::InterfaceNameSniff;
pub use trait_name::TraitNameSniff;
