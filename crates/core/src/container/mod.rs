pub mod arguments;
pub mod binding;
pub mod catalog;
pub mod debug;
pub mod descriptor;
pub mod global;
pub mod lifetime;
pub mod monitor;
pub mod registry;
pub mod resolver;

pub use arguments::{instance, Arguments, Instance, Overrides};
pub use binding::{Binding, Factory, FactoryFn, Implementation, ImplementationKind};
pub use catalog::TypeCatalog;
pub use debug::BindingInfo;
pub use descriptor::{strip_nullable, type_identifier, Constructible, Constructor, Parameter, TypeDescriptor};
pub use global::default_registry;
pub use lifetime::Lifetime;
pub use monitor::{DepthGuard, ResolutionGuard, ResolutionMonitor};
pub use registry::Registry;
pub use resolver::{DependencyResolver, ParameterResolver, ParameterSource};
