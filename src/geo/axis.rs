use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::SliceError;

/// One of the three world axes a model can be sliced along.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub enum Axis{
    #[serde(alias = "x")]
    X,
    #[serde(alias = "y")]
    Y,
    #[serde(alias = "z")]
    Z,
}

impl Axis {
    pub const ALL: [Axis;3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(index:usize) -> Result<Self,SliceError> {
        match index {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            _ => Err(SliceError::InvalidParameter(format!("axis index {index} is not in 0..3"))),
        }
    }

    /// Unit vector pointing along the axis.
    pub fn unit(self) -> Vector3<f32> {
        self.along(1.0)
    }

    /// A vector with `length` on this axis and zero elsewhere.
    pub fn along(self, length:f32) -> Vector3<f32> {
        let mut v = Vector3::zeros();
        v[self.index()] = length;
        v
    }

    /// The two axes spanning the plane perpendicular to this axis, in (column, row) order.
    pub fn in_plane(self) -> [Axis;2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f,"X"),
            Axis::Y => write!(f,"Y"),
            Axis::Z => write!(f,"Z"),
        }
    }
}

impl FromStr for Axis {
    type Err = SliceError;
    fn from_str(s:&str) -> Result<Self,Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(Axis::X),
            "Y" => Ok(Axis::Y),
            "Z" => Ok(Axis::Z),
            other => match other.parse::<usize>() {
                Ok(index) => Axis::from_index(index),
                Err(_) => Err(SliceError::InvalidParameter(format!("unknown axis '{other}', expected X, Y, Z or 0..3"))),
            },
        }
    }
}

#[test]
fn axis_from_str_test(){
    assert_eq!("z".parse::<Axis>().unwrap(), Axis::Z);
    assert_eq!(" X ".parse::<Axis>().unwrap(), Axis::X);
    assert!(matches!("w".parse::<Axis>(), Err(SliceError::InvalidParameter(_))));
}

#[test]
fn axis_from_index_test(){
    for axis in Axis::ALL {
        assert_eq!(Axis::from_index(axis.index()).unwrap(), axis);
    }
    assert_eq!("1".parse::<Axis>().unwrap(), Axis::Y);
    assert!(matches!(Axis::from_index(3), Err(SliceError::InvalidParameter(_))));
    assert!(matches!("3".parse::<Axis>(), Err(SliceError::InvalidParameter(_))));
}

#[test]
fn in_plane_axes_exclude_slicing_axis_test(){
    for axis in Axis::ALL {
        let [col,row] = axis.in_plane();
        assert_ne!(col,axis);
        assert_ne!(row,axis);
        assert!(col.index() < row.index());
    }
}
