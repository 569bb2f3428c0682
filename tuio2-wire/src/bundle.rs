use tuio2_types::Timetag;

/// One OSC-style typed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i32),
    Float(f32),
    Str(String),
    Blob(Vec<u8>),
    Time(Timetag),
}

impl Arg {
    pub fn type_char(&self) -> char {
        match self {
            Arg::Int(_) => 'i',
            Arg::Float(_) => 'f',
            Arg::Str(_) => 's',
            Arg::Blob(_) => 'b',
            Arg::Time(_) => 't',
        }
    }
}

/// A single path-addressed wire record: the decoded form of one OSC message,
/// before it is interpreted against the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub path: String,
    pub type_tags: String,
    pub args: Vec<Arg>,
}

impl Record {
    pub fn new(path: impl Into<String>, args: Vec<Arg>) -> Record {
        let mut type_tags = String::from(",");
        type_tags.extend(args.iter().map(Arg::type_char));
        Record {
            path: path.into(),
            type_tags,
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Bundle(Bundle),
    Record(Record),
}

/// A nested OSC-style bundle: a timetag plus an ordered sequence of
/// size-prefixed elements, each itself a bundle or a message record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bundle {
    pub timetag: Timetag,
    pub elements: Vec<Element>,
}

impl Bundle {
    pub fn new(timetag: Timetag) -> Bundle {
        Bundle {
            timetag,
            elements: Vec::new(),
        }
    }

    pub fn push_record(&mut self, record: Record) {
        self.elements.push(Element::Record(record));
    }

    pub fn push_bundle(&mut self, bundle: Bundle) {
        self.elements.push(Element::Bundle(bundle));
    }

    /// All top-level and nested records, depth-first in append order.
    pub fn records(&self) -> Vec<&Record> {
        let mut out = Vec::new();
        self.collect_records(&mut out);
        out
    }

    fn collect_records<'a>(&'a self, out: &mut Vec<&'a Record>) {
        for element in &self.elements {
            match element {
                Element::Record(r) => out.push(r),
                Element::Bundle(b) => b.collect_records(out),
            }
        }
    }
}
