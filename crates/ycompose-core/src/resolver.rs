//! Variable resolvers.
//!
//! A resolver answers "what is the value of `NAME`?" for the variable
//! expander. Resolvers are combined into an ordered [`ResolverChain`]; the
//! first one that knows the name wins.

use crate::error::{Error, ErrorKind, Result};
use ycompose_runtime::SystemRuntime;
use ycompose_yaml::Node;

/// Looks up variable values by name.
///
/// `Ok(None)` means "not known here". Returning an error of kind
/// [`ErrorKind::VarNotFound`] is treated the same way by a chain; any other
/// error aborts the expansion.
pub trait VarResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Option<String>>;
}

impl<F> VarResolver for F
where
    F: Fn(&str) -> Result<Option<String>> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Result<Option<String>> {
        self(name)
    }
}

/// Resolves from the environment of a [`SystemRuntime`].
pub struct EnvVarResolver<'a> {
    runtime: &'a dyn SystemRuntime,
}

impl<'a> EnvVarResolver<'a> {
    pub fn new(runtime: &'a dyn SystemRuntime) -> Self {
        Self { runtime }
    }
}

impl VarResolver for EnvVarResolver<'_> {
    fn resolve(&self, name: &str) -> Result<Option<String>> {
        self.runtime.env_get(name).map_err(|e| {
            Error::io(format!("failed to read environment variable {}", name)).with_cause(e)
        })
    }
}

/// Resolves from the variables declared in directive blocks.
pub struct DirectiveVarResolver<'a> {
    variables: &'a Node,
}

impl<'a> DirectiveVarResolver<'a> {
    /// `variables` is the accumulated `variables` mapping of a load.
    pub fn new(variables: &'a Node) -> Self {
        Self { variables }
    }
}

impl VarResolver for DirectiveVarResolver<'_> {
    fn resolve(&self, name: &str) -> Result<Option<String>> {
        match self.variables.get(name) {
            None => Ok(None),
            Some(value) if value.is_scalar() => Ok(Some(value.value().to_string())),
            Some(_) => Err(Error::directive(format!(
                "variable {} must be a scalar node",
                name
            ))),
        }
    }
}

/// Ordered list of resolvers, consulted first to last.
#[derive(Default)]
pub struct ResolverChain<'a> {
    resolvers: Vec<&'a dyn VarResolver>,
}

impl<'a> ResolverChain<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: &'a dyn VarResolver) -> Self {
        self.resolvers.push(resolver);
        self
    }
}

impl VarResolver for ResolverChain<'_> {
    fn resolve(&self, name: &str) -> Result<Option<String>> {
        for resolver in &self.resolvers {
            match resolver.resolve(name) {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => continue,
                Err(e) if e.kind() == ErrorKind::VarNotFound => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ycompose_runtime::VirtualRuntime;
    use ycompose_yaml::parse_file;

    #[test]
    fn test_env_resolver() {
        let rt = VirtualRuntime::new().with_env("KEY", "aaa");
        let env = EnvVarResolver::new(&rt);
        assert_eq!(env.resolve("KEY").unwrap().as_deref(), Some("aaa"));
        assert_eq!(env.resolve("OTHER").unwrap(), None);
    }

    #[test]
    fn test_directive_resolver() {
        let vars = parse_file("KEY: 10\nLIST: [1, 2]\n", "vars.yml").unwrap();
        let directive = DirectiveVarResolver::new(&vars);
        assert_eq!(directive.resolve("KEY").unwrap().as_deref(), Some("10"));
        assert_eq!(directive.resolve("NOPE").unwrap(), None);

        let err = directive.resolve("LIST").unwrap_err();
        assert_eq!(
            err.to_string(),
            "directive error: variable LIST must be a scalar node"
        );
    }

    #[test]
    fn test_chain_order_and_fallthrough() {
        let rt = VirtualRuntime::new().with_env("KEY", "from-env");
        let vars = parse_file("KEY: from-vars\nKEY2: bbb\n", "vars.yml").unwrap();
        let missing = |name: &str| -> Result<Option<String>> {
            Err(Error::var_not_found(format!("{} not found", name)))
        };

        let env = EnvVarResolver::new(&rt);
        let directive = DirectiveVarResolver::new(&vars);
        let chain = ResolverChain::new()
            .with(&missing)
            .with(&env)
            .with(&directive);

        assert_eq!(chain.resolve("KEY").unwrap().as_deref(), Some("from-env"));
        assert_eq!(chain.resolve("KEY2").unwrap().as_deref(), Some("bbb"));
        assert_eq!(chain.resolve("KEY3").unwrap(), None);
    }

    #[test]
    fn test_chain_stops_on_other_errors() {
        let failing =
            |_: &str| -> Result<Option<String>> { Err(Error::directive("resolver is broken")) };
        let fallback = |_: &str| -> Result<Option<String>> { Ok(Some("x".to_string())) };
        let chain = ResolverChain::new().with(&failing).with(&fallback);
        assert!(chain.resolve("A").unwrap_err().is(ErrorKind::Directive));
    }
}
