//! The contract registry.
//!
//! Contracts are declared explicitly and registered once through
//! [`RegistryBuilder`]. Building the registry flattens inherited actions,
//! resolves model endpoints, synthesizes one route per action, compiles the
//! access rule and fills the routing table. The result is immutable and is
//! shared by every request.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use http::Method;
use swiftapi_authz::AccessRule;
use swiftapi_core::{Action, Contract, HttpVerb, Model, ModelCatalog, ServiceResolver};
use swiftapi_docs::DocumentedAction;
use swiftapi_router::{synthesize, RouteLookup, RouteTemplate, Router, RouterError};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors raised while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two actions synthesize the same verb and path.
    #[error("duplicate route {verb} {path} (declared by {contract}.{action})")]
    DuplicateRoute {
        /// The conflicting verb.
        verb: HttpVerb,
        /// The conflicting path template.
        path: String,
        /// Contract declaring the second action.
        contract: String,
        /// The second action.
        action: String,
    },

    /// Two contracts share a type name.
    #[error("contract {0} is registered more than once")]
    DuplicateContract(String),

    /// A model endpoint names an interface that is not registered.
    #[error("model endpoint {contract} references unknown interface {interface}")]
    UnresolvedInterface {
        /// The model-endpoint contract.
        contract: String,
        /// The missing interface.
        interface: String,
    },

    /// A model endpoint names an implementation the resolver cannot create.
    #[error("model endpoint {contract} references unresolvable implementation {implementation}")]
    UnresolvedImplementation {
        /// The model-endpoint contract.
        contract: String,
        /// The missing implementation.
        implementation: String,
    },

    /// The routing table rejected a route.
    #[error(transparent)]
    Router(RouterError),

    /// A contract extends a contract that is not registered.
    #[error("contract {contract} extends unknown contract {parent}")]
    UnresolvedParent {
        /// The extending contract.
        contract: String,
        /// The missing parent.
        parent: String,
    },
}

/// One routed action with everything compiled for it.
#[derive(Debug)]
pub struct RegisteredAction {
    contract: Arc<Contract>,
    index: usize,
    route: RouteTemplate,
    access: AccessRule,
    operation_id: String,
}

impl RegisteredAction {
    /// The contract, with inherited actions flattened in.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// The action.
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.contract.actions()[self.index]
    }

    /// The synthesized route.
    #[must_use]
    pub const fn route(&self) -> &RouteTemplate {
        &self.route
    }

    /// The compiled access rule.
    #[must_use]
    pub const fn access(&self) -> &AccessRule {
        &self.access
    }

    /// Operation id, `{contract}_{action}` in lowercase.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// A view for the documentation emitter.
    #[must_use]
    pub fn documented(&self) -> DocumentedAction<'_> {
        DocumentedAction {
            contract: &self.contract,
            action: self.action(),
            route: &self.route,
            access: &self.access,
        }
    }
}

/// Immutable table of contracts, actions and routes.
#[derive(Debug)]
pub struct ContractRegistry {
    contracts: Vec<Arc<Contract>>,
    actions: Vec<RegisteredAction>,
    router: Router,
    catalog: ModelCatalog,
}

impl ContractRegistry {
    /// Creates a registry builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up the action for a request.
    ///
    /// The returned route id indexes [`ContractRegistry::action`].
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> RouteLookup {
        self.router.lookup(method, path)
    }

    /// Returns the action registered under `route_id`.
    #[must_use]
    pub fn action(&self, route_id: usize) -> Option<&RegisteredAction> {
        self.actions.get(route_id)
    }

    /// All routed actions, in registration order.
    #[must_use]
    pub fn actions(&self) -> &[RegisteredAction] {
        &self.actions
    }

    /// Routed contracts with flattened actions.
    pub fn contracts(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter().map(AsRef::as_ref)
    }

    /// Finds a routed contract by type name.
    #[must_use]
    pub fn contract(&self, type_name: &str) -> Option<&Contract> {
        self.contracts().find(|c| c.type_name() == type_name)
    }

    /// Registered models.
    #[must_use]
    pub const fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Number of routed actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing is routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Collects contract declarations and builds a [`ContractRegistry`].
///
/// # Example
///
/// ```rust
/// use swiftapi::{ContractRegistry, ServiceContainer};
/// use swiftapi::core::{Action, Contract, Parameter, TypeDescriptor};
///
/// let registry = ContractRegistry::builder()
///     .interface(Contract::builder("Auditable").action(Action::get("History")).build())
///     .contract(
///         Contract::builder("Orders")
///             .extends("Auditable")
///             .action(Action::get("Find").param(Parameter::route("id", TypeDescriptor::int32())))
///             .build(),
///     )
///     .build(&ServiceContainer::new())
///     .unwrap();
///
/// let paths: Vec<_> = registry.actions().iter().map(|a| a.route().path()).collect();
/// assert_eq!(paths, ["api/orders/find/{id}", "api/orders/history"]);
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct RegistryBuilder {
    contracts: Vec<Contract>,
    interfaces: Vec<Contract>,
    catalog: ModelCatalog,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a routed contract.
    pub fn contract(mut self, contract: Contract) -> Self {
        self.contracts.push(contract);
        self
    }

    /// Registers several routed contracts.
    pub fn contracts(mut self, contracts: impl IntoIterator<Item = Contract>) -> Self {
        self.contracts.extend(contracts);
        self
    }

    /// Registers a contract that is only inherited or served through a
    /// model endpoint, never routed by itself.
    pub fn interface(mut self, contract: Contract) -> Self {
        self.interfaces.push(contract);
        self
    }

    /// Registers a model for schemas and named type references.
    pub fn model(mut self, model: Model) -> Self {
        self.catalog.insert(model);
        self
    }

    /// Registers several models.
    pub fn models(mut self, models: impl IntoIterator<Item = Model>) -> Self {
        for model in models {
            self.catalog.insert(model);
        }
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Fails if a contract name is registered twice, a parent or model
    /// endpoint cannot be resolved, or two actions share a route.
    #[instrument(
        skip_all,
        fields(contracts = self.contracts.len(), interfaces = self.interfaces.len())
    )]
    pub fn build(self, resolver: &dyn ServiceResolver) -> Result<ContractRegistry, RegistryError> {
        let mut known: HashMap<&str, &Contract> = HashMap::new();
        for contract in self.contracts.iter().chain(&self.interfaces) {
            if known.insert(contract.type_name(), contract).is_some() {
                return Err(RegistryError::DuplicateContract(
                    contract.type_name().to_string(),
                ));
            }
        }

        let mut contracts = Vec::with_capacity(self.contracts.len());
        let mut actions = Vec::new();
        let mut router = Router::new();

        for declared in &self.contracts {
            let mut roots: Vec<&str> = Vec::new();
            if let Some(endpoint) = declared.model_endpoint() {
                if !known.contains_key(endpoint.interface.as_str()) {
                    return Err(RegistryError::UnresolvedInterface {
                        contract: declared.type_name().to_string(),
                        interface: endpoint.interface.clone(),
                    });
                }
                if !resolver.can_resolve(&endpoint.implementation) {
                    return Err(RegistryError::UnresolvedImplementation {
                        contract: declared.type_name().to_string(),
                        implementation: endpoint.implementation.clone(),
                    });
                }
                roots.push(&endpoint.interface);
            }
            roots.extend(declared.parents().iter().map(String::as_str));

            let flattened = flatten(declared, &roots, &known)?;
            if !resolver.can_resolve(flattened.service_name()) {
                warn!(
                    contract = %flattened.type_name(),
                    service = %flattened.service_name(),
                    "no service registered; requests will fail"
                );
            }

            let contract = Arc::new(flattened);
            for index in 0..contract.actions().len() {
                let action = &contract.actions()[index];
                let route = synthesize(&contract, action);
                let route_id = actions.len();
                router.insert(&route, route_id).map_err(|err| match err {
                    RouterError::DuplicateRoute { verb, path } => RegistryError::DuplicateRoute {
                        verb,
                        path,
                        contract: contract.type_name().to_string(),
                        action: action.method_name().to_string(),
                    },
                    other => RegistryError::Router(other),
                })?;

                let operation_id = format!("{}_{}", contract.route_name(), action.method_name())
                    .to_lowercase();
                debug!(
                    verb = %route.verb(),
                    path = %route.path(),
                    operation_id = %operation_id,
                    "route registered"
                );
                actions.push(RegisteredAction {
                    access: AccessRule::compile(&contract, action),
                    contract: Arc::clone(&contract),
                    index,
                    route,
                    operation_id,
                });
            }
            contracts.push(contract);
        }

        info!(
            contracts = contracts.len(),
            routes = actions.len(),
            models = self.catalog.len(),
            "contract registry built"
        );
        Ok(ContractRegistry {
            contracts,
            actions,
            router,
            catalog: self.catalog,
        })
    }
}

/// Collects the contract's own actions followed by those inherited from
/// `roots`, depth first. Each contract is visited once; the first action with
/// a given method name and verb wins.
fn flatten(
    contract: &Contract,
    roots: &[&str],
    known: &HashMap<&str, &Contract>,
) -> Result<Contract, RegistryError> {
    let mut visited: HashSet<&str> = HashSet::from([contract.type_name()]);
    let mut seen: HashSet<(String, HttpVerb)> = HashSet::new();
    let mut actions = Vec::new();

    let mut push = |action: &Action, actions: &mut Vec<Action>| {
        if seen.insert((action.method_name().to_string(), action.verb())) {
            actions.push(action.clone());
        }
    };
    for action in contract.actions() {
        push(action, &mut actions);
    }

    let mut stack: Vec<(&str, &str)> = roots
        .iter()
        .rev()
        .map(|root| (contract.type_name(), *root))
        .collect();
    while let Some((child, name)) = stack.pop() {
        if !visited.insert(name) {
            continue;
        }
        let parent = known.get(name).copied().ok_or_else(|| RegistryError::UnresolvedParent {
            contract: child.to_string(),
            parent: name.to_string(),
        })?;
        for action in parent.actions() {
            push(action, &mut actions);
        }
        stack.extend(
            parent
                .parents()
                .iter()
                .rev()
                .map(|grandparent| (parent.type_name(), grandparent.as_str())),
        );
    }

    Ok(contract.with_actions(actions))
}
