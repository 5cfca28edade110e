use spec::{
    ConstructorArg, DeploymentModule, DeploymentOperation, NetworkProfile, Placeholder,
    RenderedArg,
};
use std::collections::{BTreeSet, HashMap, VecDeque};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("module `{0}` is already declared")]
    DuplicateModule(String),
    #[error("cyclic dependency between modules: {}", format_cycle(.0))]
    CyclicDependency(Vec<String>),
    #[error("module `{module}` references unknown module `{reference}`")]
    UnknownModuleReference { module: String, reference: String },
    #[error("module `{module}` references output `{output}` of `{reference}`, which declares `{declared}`")]
    UnknownModuleOutput {
        module: String,
        reference: String,
        output: String,
        declared: String,
    },
}

fn format_cycle(members: &[String]) -> String {
    let mut path = members.join(" -> ");
    if let Some(first) = members.first() {
        path.push_str(" -> ");
        path.push_str(first);
    }
    path
}

#[derive(Debug, Default, Clone)]
pub struct ModuleSet {
    modules: Vec<DeploymentModule>,
    index: HashMap<String, usize>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_module(
        &mut self,
        id: impl Into<String>,
        contract: impl Into<String>,
        args: Vec<ConstructorArg>,
    ) -> Result<&DeploymentModule, ResolveError> {
        self.add(DeploymentModule::new(id, contract, args))
    }

    pub fn add(
        &mut self,
        module: impl Into<DeploymentModule>,
    ) -> Result<&DeploymentModule, ResolveError> {
        let module = module.into();
        if self.index.contains_key(&module.id) {
            return Err(ResolveError::DuplicateModule(module.id));
        }

        let position = self.modules.len();
        self.index.insert(module.id.clone(), position);
        self.modules.push(module);
        Ok(&self.modules[position])
    }

}

impl TryFrom<Vec<DeploymentModule>> for ModuleSet {
    type Error = ResolveError;

    fn try_from(modules: Vec<DeploymentModule>) -> Result<Self, Self::Error> {
        let mut set = ModuleSet::new();
        for module in modules {
            set.add(module)?;
        }
        Ok(set)
    }
}

/// Modules in an order where every referenced module comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub modules: Vec<DeploymentModule>,
}

impl ResolvedPlan {
    pub fn ids(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.id.as_str()).collect()
    }
}

/// Orders the modules so that every reference points backwards. Modules with
/// no constraint between them keep their declaration order.
pub fn resolve(set: &ModuleSet) -> Result<ResolvedPlan, ResolveError> {
    let n = set.modules.len();

    // dependents[i]: modules that reference module i
    let mut dependents: Vec<Vec<usize>> = vec![vec![]; n];
    let mut in_degree = vec![0usize; n];

    for (i, module) in set.modules.iter().enumerate() {
        let mut seen = BTreeSet::new();
        for arg in &module.args {
            let ConstructorArg::Ref { module: target, output } = arg else {
                continue;
            };
            let j = *set
                .index
                .get(target)
                .ok_or_else(|| ResolveError::UnknownModuleReference {
                    module: module.id.clone(),
                    reference: target.clone(),
                })?;

            if let Some(output) = output {
                let declared = &set.modules[j].output;
                if output != declared {
                    return Err(ResolveError::UnknownModuleOutput {
                        module: module.id.clone(),
                        reference: target.clone(),
                        output: output.clone(),
                        declared: declared.clone(),
                    });
                }
            }

            // the same dependency passed twice is still one edge
            if seen.insert(j) {
                dependents[j].push(i);
                in_degree[i] += 1;
            }
        }
    }

    // ready set ordered by declaration position
    let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &d in &dependents[i] {
            in_degree[d] -= 1;
            if in_degree[d] == 0 {
                ready.insert(d);
            }
        }
    }

    if order.len() < n {
        let cycle = find_cycle(&dependents, &in_degree);
        let members = cycle.into_iter().map(|i| set.modules[i].id.clone()).collect();
        return Err(ResolveError::CyclicDependency(members));
    }

    tracing::debug!(order = ?order.iter().map(|&i| &set.modules[i].id).collect::<Vec<_>>(), "resolved deployment order");

    Ok(ResolvedPlan {
        modules: order.into_iter().map(|i| set.modules[i].clone()).collect(),
    })
}

/// One cycle among the modules left over after ordering, starting from the
/// earliest declared module that lies on a cycle.
fn find_cycle(dependents: &[Vec<usize>], in_degree: &[usize]) -> Vec<usize> {
    let remaining: BTreeSet<usize> = (0..in_degree.len())
        .filter(|&i| in_degree[i] > 0)
        .collect();

    remaining
        .iter()
        .find_map(|&start| cycle_through(start, dependents, &remaining))
        .unwrap_or_default()
}

fn cycle_through(
    start: usize,
    dependents: &[Vec<usize>],
    remaining: &BTreeSet<usize>,
) -> Option<Vec<usize>> {
    let mut parent: HashMap<usize, usize> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let mut next: Vec<usize> = dependents[current]
            .iter()
            .copied()
            .filter(|d| remaining.contains(d))
            .collect();
        next.sort_unstable();

        for d in next {
            if d == start {
                let mut path = vec![current];
                let mut node = current;
                while let Some(&p) = parent.get(&node) {
                    path.push(p);
                    node = p;
                }
                path.reverse();
                return Some(path);
            }
            if !parent.contains_key(&d) {
                parent.insert(d, current);
                queue.push_back(d);
            }
        }
    }

    None
}

/// References become placeholders the executor binds once the referenced
/// module is deployed.
pub fn render(plan: &ResolvedPlan, network: &NetworkProfile) -> Vec<DeploymentOperation> {
    let outputs: HashMap<&str, &str> = plan
        .modules
        .iter()
        .map(|m| (m.id.as_str(), m.output.as_str()))
        .collect();

    let operations: Vec<DeploymentOperation> = plan
        .modules
        .iter()
        .enumerate()
        .map(|(step, module)| DeploymentOperation {
            step,
            module: module.id.clone(),
            contract: module.contract.clone(),
            output: module.output.clone(),
            args: module
                .args
                .iter()
                .map(|arg| match arg {
                    ConstructorArg::Literal(literal) => RenderedArg::Value(literal.clone()),
                    ConstructorArg::Ref { module, output } => RenderedArg::Pending(Placeholder {
                        module: module.clone(),
                        output: output.clone().unwrap_or_else(|| {
                            outputs
                                .get(module.as_str())
                                .map(|o| o.to_string())
                                .unwrap_or_else(|| spec::DEFAULT_OUTPUT.to_string())
                        }),
                    }),
                })
                .collect(),
        })
        .collect();

    for op in &operations {
        tracing::debug!(
            network = network.name(),
            chain_id = network.chain_id(),
            step = op.step,
            module = %op.module,
            contract = %op.contract,
            pending = op.pending().count(),
            "rendered operation"
        );
    }

    operations
}
