use super::{coerce, flat_to_matrix, initial_value, DataType, Form, Init, Slot, Value};
use crate::base::{sym_to_matrix, Error, Result};
use russell_lab::Matrix;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Holds the name of the pseudo-variable aggregating all extra variables
pub const EXTRA_VARIABLES: &str = "extra variables";

/// Holds one registered variable and its three copies
#[derive(Clone, Debug)]
pub struct NamedValue {
    /// Name as given at registration
    pub name: String,

    /// Declared type
    pub dtype: DataType,

    /// Provisional value within the current step
    value: Value,

    /// Value at the end of the last converged step
    old_value: Value,

    /// Scratch copy used while perturbing the state
    stashed_value: Value,

    /// Indicates that stores are ignored
    pub constant: bool,

    /// Plot key (upper case) or None if the variable is not written to the output
    pub plot_key: Option<String>,

    /// Plot name or None if the variable is not written to the output
    pub plot_name: Option<String>,
}

impl NamedValue {
    fn slot(&self, slot: Slot) -> &Value {
        match slot {
            Slot::Old => &self.old_value,
            Slot::Current => &self.value,
            Slot::Stashed => &self.stashed_value,
        }
    }
}

/// Implements a collection of named, typed variables with old, current and stashed copies
///
/// The old copy holds the state at the end of the last converged step and is the one
/// written to the output. The current copy is provisional and becomes old on [DataContainer::advance].
/// The stashed copy is only written by [DataContainer::stash].
#[derive(Clone, Debug)]
pub struct DataContainer {
    /// Name of this container (used in error messages)
    name: String,

    /// Variables keyed by the lower-cased name
    data: HashMap<String, NamedValue>,

    /// Lower-cased names in registration order
    order: Vec<String>,

    /// Plot keys in registration order
    plot_keys: Vec<String>,

    /// Maps plot keys to the lower-cased variable name and the component index (if any)
    plot_key_map: HashMap<String, (String, Option<usize>)>,

    /// Lower-cased names of the extra variables in index order
    xtra: Vec<String>,

    /// Indicates that the extra variables have been registered
    xtra_registered: bool,

    /// Options in registration order
    options: Vec<(String, Value)>,
}

impl DataContainer {
    /// Allocates a new empty container
    pub fn new(name: &str) -> Self {
        DataContainer {
            name: name.to_string(),
            data: HashMap::new(),
            order: Vec::new(),
            plot_keys: Vec::new(),
            plot_key_map: HashMap::new(),
            xtra: Vec::new(),
            xtra_registered: false,
            options: Vec::new(),
        }
    }

    /// Returns the name of this container
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a new variable
    ///
    /// # Input
    ///
    /// * `name` -- unique name (case-insensitive)
    /// * `dtype` -- type of the variable
    /// * `init` -- initial value copied to all three slots
    /// * `plot_key` -- plot key; vectors and tensors expand it into one key per component
    pub fn register(&mut self, name: &str, dtype: DataType, init: Init, plot_key: Option<&str>) -> Result<()> {
        self.register_with(name, dtype, init, plot_key, false)
    }

    /// Registers a new variable whose stores are ignored
    pub fn register_constant(
        &mut self,
        name: &str,
        dtype: DataType,
        init: Init,
        plot_key: Option<&str>,
    ) -> Result<()> {
        self.register_with(name, dtype, init, plot_key, true)
    }

    fn register_with(
        &mut self,
        name: &str,
        dtype: DataType,
        init: Init,
        plot_key: Option<&str>,
        constant: bool,
    ) -> Result<()> {
        let lower = name.to_lowercase();
        if self.data.contains_key(&lower) || lower == EXTRA_VARIABLES {
            return Err(Error::DuplicateName(name.to_string()));
        }
        let value = initial_value(name, dtype, init)?;
        let dtype = match (dtype, &value) {
            (DataType::Matrix(0), Value::Reals(v)) => DataType::Matrix((v.len() as f64).sqrt().round() as usize),
            _ => dtype,
        };

        // expand plot keys
        let mut entries = Vec::new();
        let mut plot_name = None;
        if let Some(key) = plot_key {
            let key = key.trim().to_uppercase().replace(' ', "_");
            let components: Vec<&str> = match dtype {
                DataType::Scalar | DataType::Boolean => Vec::new(),
                DataType::Vector => vec!["1", "2", "3"],
                DataType::SymTensor => vec!["11", "22", "33", "12", "23", "13"],
                DataType::Tensor => vec!["11", "12", "13", "21", "22", "23", "31", "32", "33"],
                _ => return Err(Error::type_mismatch(name, format!("{} cannot be plotted", dtype))),
            };
            if components.is_empty() {
                entries.push((key.clone(), None));
                plot_name = Some(name.to_string());
            } else {
                for (i, comp) in components.iter().enumerate() {
                    entries.push((format!("{}{}", key, comp), Some(i)));
                }
                let names: Vec<_> = components.iter().map(|c| format!("{} component {}", c, name)).collect();
                plot_name = Some(names.join(", "));
            }
            for (k, _) in &entries {
                if self.plot_key_map.contains_key(k) {
                    return Err(Error::DuplicateName(k.clone()));
                }
            }
        }
        for (k, comp) in entries {
            self.plot_keys.push(k.clone());
            self.plot_key_map.insert(k, (lower.clone(), comp));
        }

        debug!("{}: registered {} ({})", self.name, name, dtype);
        self.data.insert(
            lower.clone(),
            NamedValue {
                name: name.to_string(),
                dtype,
                value: value.clone(),
                old_value: value.clone(),
                stashed_value: value,
                constant,
                plot_key: plot_key.map(|k| k.trim().to_uppercase().replace(' ', "_")),
                plot_name,
            },
        );
        self.order.push(lower);
        Ok(())
    }

    /// Removes a variable (warns if it does not exist)
    pub fn unregister(&mut self, name: &str) {
        let lower = name.to_lowercase();
        if self.data.remove(&lower).is_none() {
            warn!("{}: attempting to unregister {}, which is not registered", self.name, name);
            return;
        }
        self.order.retain(|n| n != &lower);
        self.xtra.retain(|n| n != &lower);
        let removed: Vec<String> = self
            .plot_keys
            .iter()
            .filter(|k| matches!(self.plot_key_map.get(*k), Some((n, _)) if n == &lower))
            .cloned()
            .collect();
        for key in &removed {
            self.plot_key_map.remove(key);
        }
        self.plot_keys.retain(|k| !removed.contains(k));
    }

    /// Returns whether a variable (or plot key) is registered
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(&name.to_lowercase())
            || self.plot_key_map.contains_key(&name.to_uppercase())
            || (name.eq_ignore_ascii_case(EXTRA_VARIABLES) && self.xtra_registered)
    }

    /// Returns the registered variable
    pub fn named_value(&self, name: &str) -> Result<&NamedValue> {
        self.data.get(&name.to_lowercase()).ok_or_else(|| self.not_registered(name))
    }

    /// Returns the value of a variable
    ///
    /// # Input
    ///
    /// * `name` -- variable name, a plot key (returns the component as a scalar), or [EXTRA_VARIABLES]
    /// * `slot` -- which copy to read
    /// * `form` -- representation of the returned value
    pub fn get(&self, name: &str, slot: Slot, form: Form) -> Result<Value> {
        if name.eq_ignore_ascii_case(EXTRA_VARIABLES) {
            return Ok(Value::Reals(self.get_xtra(slot)?));
        }
        let lower = name.to_lowercase();
        if let Some(nv) = self.data.get(&lower) {
            return format_value(nv, nv.slot(slot), form);
        }
        if let Some((var, comp)) = self.plot_key_map.get(&name.to_uppercase()) {
            let nv = self.data.get(var).ok_or_else(|| self.not_registered(name))?;
            return Ok(Value::Scalar(component(nv.slot(slot), *comp)));
        }
        Err(self.not_registered(name))
    }

    /// Returns a scalar variable (or component selected by plot key)
    pub fn scalar(&self, name: &str, slot: Slot) -> Result<f64> {
        match self.get(name, slot, Form::Array)? {
            Value::Scalar(x) => Ok(x),
            Value::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
            _ => Err(Error::type_mismatch(name, "not a scalar")),
        }
    }

    /// Returns the old value of a scalar variable
    pub fn scalar_old(&self, name: &str) -> Result<f64> {
        self.scalar(name, Slot::Old)
    }

    /// Returns the current value of a scalar variable
    pub fn scalar_cur(&self, name: &str) -> Result<f64> {
        self.scalar(name, Slot::Current)
    }

    /// Returns the flat components of a variable
    pub fn array(&self, name: &str, slot: Slot) -> Result<Vec<f64>> {
        match self.get(name, slot, Form::Array)? {
            Value::Reals(v) => Ok(v),
            Value::Scalar(x) => Ok(vec![x]),
            _ => Err(Error::type_mismatch(name, "not an array of reals")),
        }
    }

    /// Returns the old components of a variable
    pub fn array_old(&self, name: &str) -> Result<Vec<f64>> {
        self.array(name, Slot::Old)
    }

    /// Returns the current components of a variable
    pub fn array_cur(&self, name: &str) -> Result<Vec<f64>> {
        self.array(name, Slot::Current)
    }

    /// Returns a tensor or matrix variable as a matrix
    pub fn matrix(&self, name: &str, slot: Slot) -> Result<Matrix> {
        match self.get(name, slot, Form::Matrix)? {
            Value::Matrix(m) => Ok(m),
            _ => Err(Error::type_mismatch(name, "not a matrix")),
        }
    }

    /// Stores a new current value
    ///
    /// Constant variables ignore stores. A 3×3 matrix stored in a tensor is flattened.
    pub fn store(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.store_at(name, value.into(), Slot::Current)
    }

    /// Stores a new old value (used to set initial states)
    pub fn store_old(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.store_at(name, value.into(), Slot::Old)
    }

    fn store_at(&mut self, name: &str, value: Value, slot: Slot) -> Result<()> {
        if name.eq_ignore_ascii_case(EXTRA_VARIABLES) {
            return self.store_xtra(value, slot);
        }
        let nv = match self.data.get_mut(&name.to_lowercase()) {
            Some(nv) => nv,
            None => return Err(self.not_registered(name)),
        };
        if nv.constant {
            return Ok(());
        }
        let value = coerce(&nv.name, nv.dtype, value)?;
        match slot {
            Slot::Old => nv.old_value = value,
            Slot::Current => nv.value = value,
            Slot::Stashed => nv.stashed_value = value,
        }
        Ok(())
    }

    /// Copies the old (or current) value into the stashed slot
    pub fn stash(&mut self, name: &str, cur: bool) -> Result<()> {
        self.transfer(name, |nv| {
            nv.stashed_value = if cur { nv.value.clone() } else { nv.old_value.clone() };
        })
    }

    /// Copies the stashed value into the old slot
    pub fn unstash(&mut self, name: &str) -> Result<()> {
        self.transfer(name, |nv| nv.old_value = nv.stashed_value.clone())
    }

    /// Copies the stashed value into the current slot
    pub fn restore(&mut self, name: &str) -> Result<()> {
        self.transfer(name, |nv| nv.value = nv.stashed_value.clone())
    }

    /// Copies the current value into the old slot
    pub fn advance(&mut self, name: &str) -> Result<()> {
        self.transfer(name, |nv| nv.old_value = nv.value.clone())
    }

    /// Stashes all variables
    pub fn stash_all(&mut self, cur: bool) {
        for nv in self.data.values_mut() {
            nv.stashed_value = if cur { nv.value.clone() } else { nv.old_value.clone() };
        }
    }

    /// Restores all variables from the stashed slot into the current slot
    pub fn restore_all(&mut self) {
        for nv in self.data.values_mut() {
            nv.value = nv.stashed_value.clone();
        }
    }

    /// Advances all variables (current becomes old)
    pub fn advance_all(&mut self) {
        for nv in self.data.values_mut() {
            nv.old_value = nv.value.clone();
        }
    }

    fn transfer<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&mut NamedValue),
    {
        if name.eq_ignore_ascii_case(EXTRA_VARIABLES) {
            if !self.xtra_registered {
                return Err(self.not_registered(name));
            }
            for key in &self.xtra {
                if let Some(nv) = self.data.get_mut(key) {
                    f(nv);
                }
            }
            return Ok(());
        }
        match self.data.get_mut(&name.to_lowercase()) {
            Some(nv) => {
                f(nv);
                Ok(())
            }
            None => Err(self.not_registered(name)),
        }
    }

    /// Registers the extra (internal state) variables of a model
    ///
    /// # Input
    ///
    /// * `names` -- names of the variables
    /// * `keys` -- plot keys of the variables
    /// * `values` -- initial values
    ///
    /// This function may be called only once. The whole batch is checked before any
    /// variable is registered; hence, nothing is registered on failure.
    pub fn register_xtra_vars(&mut self, names: &[&str], keys: &[&str], values: &[f64]) -> Result<()> {
        if self.xtra_registered {
            return Err(Error::DuplicateName(EXTRA_VARIABLES.to_string()));
        }
        if names.len() != keys.len() || names.len() != values.len() {
            return Err(Error::type_mismatch(
                EXTRA_VARIABLES,
                "the numbers of names, keys and values must be equal",
            ));
        }
        let mut batch_names = Vec::with_capacity(names.len());
        let mut batch_keys = Vec::with_capacity(keys.len());
        for (name, key) in names.iter().zip(keys) {
            let lower = name.to_lowercase();
            if self.data.contains_key(&lower) || lower == EXTRA_VARIABLES || batch_names.contains(&lower) {
                return Err(Error::DuplicateName(name.to_string()));
            }
            let key = key.trim().to_uppercase().replace(' ', "_");
            if self.plot_key_map.contains_key(&key) || batch_keys.contains(&key) {
                return Err(Error::DuplicateName(key));
            }
            batch_names.push(lower);
            batch_keys.push(key);
        }
        for i in 0..names.len() {
            self.register(names[i], DataType::Scalar, Init::Value(Value::Scalar(values[i])), Some(keys[i]))?;
            self.xtra.push(names[i].to_lowercase());
        }
        self.xtra_registered = true;
        Ok(())
    }

    /// Returns the number of extra variables
    pub fn num_xtra(&self) -> usize {
        self.xtra.len()
    }

    /// Returns the name of the i-th extra variable
    pub fn xtra_name(&self, index: usize) -> Option<&str> {
        self.xtra.get(index).and_then(|k| self.data.get(k)).map(|nv| nv.name.as_str())
    }

    fn get_xtra(&self, slot: Slot) -> Result<Vec<f64>> {
        if !self.xtra_registered {
            return Err(self.not_registered(EXTRA_VARIABLES));
        }
        let mut values = Vec::with_capacity(self.xtra.len());
        for key in &self.xtra {
            let nv = self.data.get(key).ok_or_else(|| self.not_registered(key))?;
            values.push(component(nv.slot(slot), None));
        }
        Ok(values)
    }

    fn store_xtra(&mut self, value: Value, slot: Slot) -> Result<()> {
        if !self.xtra_registered {
            return Err(self.not_registered(EXTRA_VARIABLES));
        }
        let values = match value {
            Value::Reals(v) if v.len() == self.xtra.len() => v,
            _ => {
                return Err(Error::type_mismatch(
                    EXTRA_VARIABLES,
                    format!("expected {} values", self.xtra.len()),
                ))
            }
        };
        let keys = self.xtra.clone();
        for (key, x) in keys.iter().zip(values) {
            self.store_at(key, Value::Scalar(x), slot)?;
        }
        Ok(())
    }

    /// Registers an option (a setting not subject to slots)
    pub fn register_option(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let lower = name.to_lowercase();
        if self.options.iter().any(|(n, _)| n == &lower) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        self.options.push((lower, value.into()));
        Ok(())
    }

    /// Returns an option
    pub fn get_option(&self, name: &str) -> Result<&Value> {
        let lower = name.to_lowercase();
        self.options.iter().find(|(n, _)| n == &lower).map(|(_, v)| v).ok_or_else(|| {
            Error::NotRegistered {
                name: name.to_string(),
                container: format!("{} options", self.name),
                available: self.options.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>().join(", "),
            }
        })
    }

    /// Returns the plot keys in registration order
    pub fn plot_keys(&self) -> &[String] {
        &self.plot_keys
    }

    /// Returns the old values corresponding to the plot keys
    pub fn plot_values(&self) -> Vec<f64> {
        self.plot_keys
            .iter()
            .map(|k| match self.plot_key_map.get(k).and_then(|(n, c)| self.data.get(n).map(|nv| (nv, *c))) {
                Some((nv, comp)) => component(&nv.old_value, comp),
                None => f64::NAN,
            })
            .collect()
    }

    /// Returns the registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|k| self.data.get(k))
            .map(|nv| nv.name.as_str())
            .collect()
    }

    fn not_registered(&self, name: &str) -> Error {
        Error::NotRegistered {
            name: name.to_string(),
            container: self.name.clone(),
            available: self.names().join(", "),
        }
    }
}

/// Extracts one component as a real number
fn component(value: &Value, comp: Option<usize>) -> f64 {
    match (value, comp) {
        (Value::Scalar(x), _) => *x,
        (Value::Boolean(b), _) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        (Value::Reals(v), Some(i)) => v.get(i).copied().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Converts the stored (flat, row-major) value into the requested form
fn format_value(nv: &NamedValue, value: &Value, form: Form) -> Result<Value> {
    let invalid = || Error::InvalidForm {
        name: nv.name.clone(),
        form: form.to_string(),
    };
    match form {
        Form::Array => Ok(value.clone()),
        Form::Matrix => {
            let v = value.as_reals().ok_or_else(invalid)?;
            match nv.dtype {
                DataType::SymTensor => Ok(Value::Matrix(sym_to_matrix(v))),
                DataType::Tensor | DataType::Matrix(_) => Ok(Value::Matrix(flat_to_matrix(v))),
                _ => Err(invalid()),
            }
        }
        Form::Interchange => match nv.dtype {
            DataType::Tensor | DataType::Matrix(_) => {
                let v = value.as_reals().ok_or_else(invalid)?;
                let n = (v.len() as f64).sqrt().round() as usize;
                let mut t = vec![0.0; v.len()];
                for i in 0..n {
                    for j in 0..n {
                        t[n * j + i] = v[n * i + j];
                    }
                }
                Ok(Value::Reals(t))
            }
            _ => Ok(value.clone()),
        },
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{DataContainer, EXTRA_VARIABLES};
    use crate::base::Error;
    use crate::data::{DataType, Form, Init, Slot, Value};
    use russell_lab::Matrix;

    fn sample() -> DataContainer {
        let mut dc = DataContainer::new("material data");
        dc.register("stress", DataType::SymTensor, Init::Default, Some("sig")).unwrap();
        dc.register("deformation gradient", DataType::Tensor, Init::Identity, Some("F"))
            .unwrap();
        dc.register("time", DataType::Scalar, Init::Default, Some("time")).unwrap();
        dc
    }

    #[test]
    fn register_and_get_work() {
        let dc = sample();
        let v = dc.get("Stress", Slot::Old, Form::Array).unwrap();
        assert_eq!(v.as_reals().unwrap(), &[0.0; 6]);
        let m = dc.matrix("deformation gradient", Slot::Current).unwrap();
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(
            dc.plot_keys(),
            &["SIG11", "SIG22", "SIG33", "SIG12", "SIG23", "SIG13", "F11", "F12", "F13", "F21", "F22", "F23", "F31", "F32", "F33", "TIME"]
        );
        let nv = dc.named_value("stress").unwrap();
        assert!(nv.plot_name.as_ref().unwrap().starts_with("11 component stress"));
        assert_eq!(dc.scalar_old("F22").unwrap(), 1.0);
    }

    #[test]
    fn register_catches_errors() {
        let mut dc = sample();
        assert!(matches!(
            dc.register("STRESS", DataType::SymTensor, Init::Default, None),
            Err(Error::DuplicateName(_))
        ));
        assert!(matches!(
            dc.register("strain", DataType::SymTensor, Init::Value(Value::Reals(vec![0.0; 5])), None),
            Err(Error::TypeMismatch { .. })
        ));
        match dc.get("velocity", Slot::Old, Form::Array) {
            Err(Error::NotRegistered { available, .. }) => assert!(available.contains("deformation gradient")),
            _ => panic!("expected NotRegistered"),
        }
        assert!(matches!(
            dc.get("time", Slot::Old, Form::Matrix),
            Err(Error::InvalidForm { .. })
        ));
    }

    #[test]
    fn stash_store_unstash_restores_value() {
        let mut dc = sample();
        dc.store_old("stress", vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0]).unwrap();
        dc.stash("stress", false).unwrap();
        dc.store_old("stress", vec![9.0; 6]).unwrap();
        assert_eq!(dc.array_old("stress").unwrap(), &[9.0; 6]);
        dc.unstash("stress").unwrap();
        assert_eq!(dc.array_old("stress").unwrap(), &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn advance_and_restore_work() {
        let mut dc = sample();
        dc.store("time", 0.5).unwrap();
        assert_eq!(dc.scalar_old("time").unwrap(), 0.0);
        dc.stash_all(true);
        dc.store("time", 0.75).unwrap();
        dc.restore_all();
        assert_eq!(dc.scalar_cur("time").unwrap(), 0.5);
        dc.advance("time").unwrap();
        assert_eq!(dc.scalar_old("time").unwrap(), 0.5);
        dc.store("stress", vec![1.0; 6]).unwrap();
        dc.advance_all();
        assert_eq!(dc.plot_values()[0], 1.0);
        assert_eq!(dc.plot_values()[15], 0.5);
    }

    #[test]
    fn store_flattens_matrices_and_skips_constants() {
        let mut dc = sample();
        let f = Matrix::from(&[[1.1, 0.1, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        dc.store("deformation gradient", f).unwrap();
        let v = dc.array_cur("deformation gradient").unwrap();
        assert_eq!(v, &[1.1, 0.1, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let t = dc.get("deformation gradient", Slot::Current, Form::Interchange).unwrap();
        assert_eq!(t.as_reals().unwrap(), &[1.1, 0.0, 0.0, 0.1, 1.0, 0.0, 0.0, 0.0, 1.0]);

        dc.register_constant("density", DataType::Scalar, Init::Value(Value::Scalar(2.0)), None)
            .unwrap();
        dc.store("density", 3.0).unwrap();
        assert_eq!(dc.scalar_cur("density").unwrap(), 2.0);
    }

    #[test]
    fn extra_variables_work() {
        let mut dc = sample();
        dc.register_xtra_vars(&["equivalent plastic strain", "backstress"], &["eqps", "bs"], &[0.0, 1.0])
            .unwrap();
        assert!(dc.register_xtra_vars(&["x"], &["x"], &[0.0]).is_err());
        assert_eq!(dc.num_xtra(), 2);
        assert_eq!(dc.xtra_name(1), Some("backstress"));
        dc.store(EXTRA_VARIABLES, vec![0.1, 2.0]).unwrap();
        dc.stash(EXTRA_VARIABLES, true).unwrap();
        dc.advance(EXTRA_VARIABLES).unwrap();
        let old = dc.get(EXTRA_VARIABLES, Slot::Old, Form::Array).unwrap();
        assert_eq!(old.as_reals().unwrap(), &[0.1, 2.0]);
        assert_eq!(dc.scalar_old("EQPS").unwrap(), 0.1);
        assert!(dc.store(EXTRA_VARIABLES, vec![0.0]).is_err());
    }

    #[test]
    fn failed_extra_variables_leave_no_trace() {
        let mut dc = sample();
        let n_keys = dc.plot_keys().len();

        // second name clashes with an existing variable
        let res = dc.register_xtra_vars(&["damage", "Stress"], &["dmg", "s"], &[0.0, 0.0]);
        assert!(matches!(res, Err(Error::DuplicateName(name)) if name == "Stress"));
        // repeated plot key within the batch
        let res = dc.register_xtra_vars(&["damage", "porosity"], &["dmg", "DMG"], &[0.0, 0.0]);
        assert!(matches!(res, Err(Error::DuplicateName(key)) if key == "DMG"));
        // repeated name within the batch
        let res = dc.register_xtra_vars(&["damage", "DAMAGE"], &["d1", "d2"], &[0.0, 0.0]);
        assert!(matches!(res, Err(Error::DuplicateName(_))));
        // plot key clashes with an existing component
        let res = dc.register_xtra_vars(&["damage", "porosity"], &["dmg", "sig11"], &[0.0, 0.0]);
        assert!(matches!(res, Err(Error::DuplicateName(key)) if key == "SIG11"));

        assert!(!dc.contains("damage"));
        assert!(!dc.contains("DMG"));
        assert_eq!(dc.num_xtra(), 0);
        assert_eq!(dc.plot_keys().len(), n_keys);

        // a valid batch is still accepted
        dc.register_xtra_vars(&["damage", "porosity"], &["dmg", "phi"], &[0.0, 0.1]).unwrap();
        assert_eq!(dc.num_xtra(), 2);
        assert_eq!(dc.scalar_cur("PHI").unwrap(), 0.1);
    }

    #[test]
    fn options_and_unregister_work() {
        let mut dc = sample();
        dc.register_option("kappa", 0.0).unwrap();
        assert!(dc.register_option("KAPPA", 1.0).is_err());
        assert_eq!(dc.get_option("kappa").unwrap().as_scalar(), Some(0.0));
        assert!(matches!(dc.get_option("emit"), Err(Error::NotRegistered { .. })));
        dc.unregister("stress");
        dc.unregister("stress");
        assert!(!dc.contains("stress"));
        assert!(!dc.contains("SIG11"));
        assert_eq!(dc.plot_keys().len(), 10);
    }
}
