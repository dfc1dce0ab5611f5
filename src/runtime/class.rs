use core::fmt;
use core::cell::RefCell;
use std::rc::Rc;

use crate::runtime::{Value, HashMap, DefaultBuildHasher};
use crate::runtime::function::{Function, NativeFunction};


type NameMap = HashMap<Rc<str>, Value>;

fn new_map() -> RefCell<NameMap> {
    RefCell::new(HashMap::with_hasher(DefaultBuildHasher::default()))
}


#[derive(Debug)]
pub struct Class {
    name: Rc<str>,
    methods: RefCell<NameMap>,
}

impl Class {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self { name: name.into(), methods: new_map() }
    }

    pub fn name(&self) -> &str { &self.name }

    /// Attach a method. Script functions and native functions are stored the same way.
    pub fn add_method(&self, name: Rc<str>, method: Value) {
        self.methods.borrow_mut().insert(name, method);
    }

    pub fn find_method(&self, name: &str) -> Option<Value> {
        self.methods.borrow().get(name).cloned()
    }
}


#[derive(Debug)]
pub struct Instance {
    class: Rc<Class>,
    fields: RefCell<NameMap>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self { class, fields: new_map() }
    }

    pub fn class(&self) -> &Rc<Class> { &self.class }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.borrow().get(name).cloned()
    }

    pub fn set_field(&self, name: Rc<str>, value: Value) {
        self.fields.borrow_mut().insert(name, value);
    }

    /// Fields shadow methods of the same name.
    pub fn get_property(self: &Rc<Self>, name: &str) -> Option<Value> {
        if let Some(value) = self.get_field(name) {
            return Some(value);
        }

        let method = Method::from_value(self.class.find_method(name)?)?;
        let bound = BoundMethod::new(Value::Instance(self.clone()), method);
        Some(Value::BoundMethod(Rc::new(bound)))
    }
}


#[derive(Debug, Clone)]
pub enum Method {
    Script(Rc<Function>),
    Native(Rc<NativeFunction>),
}

impl Method {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Function(function) => Some(Self::Script(function)),
            Value::NativeFunction(native) => Some(Self::Native(native)),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script(function) => write!(fmt, "{}", function),
            Self::Native(native) => write!(fmt, "{}", native),
        }
    }
}


/// A method paired with the receiver it was looked up on.
#[derive(Debug)]
pub struct BoundMethod {
    receiver: Value,
    method: Method,
}

impl BoundMethod {
    pub fn new(receiver: Value, method: Method) -> Self {
        Self { receiver, method }
    }

    pub fn receiver(&self) -> &Value { &self.receiver }
    pub fn method(&self) -> &Method { &self.method }
}
