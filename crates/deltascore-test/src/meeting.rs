//! Meeting scheduling facts.
//!
//! Time is measured in grains (fixed slots, e.g. 15 minutes). An assignment
//! places one meeting in a room at a starting grain; both are optional so a
//! partially built schedule can be scored.

use deltascore_scoring::Fact;

pub const ASSIGNMENT: &str = "MeetingAssignment";
pub const ATTENDANCE: &str = "Attendance";
pub const ROOM: &str = "Room";

/// Placement of one meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingAssignment {
    pub id: i64,
    pub meeting: i64,
    pub duration: i64,
    pub start: Option<i64>,
    pub room: Option<i64>,
}

impl MeetingAssignment {
    /// Creates an unassigned placement.
    pub fn new(id: i64, meeting: i64, duration: i64) -> Self {
        Self {
            id,
            meeting,
            duration,
            start: None,
            room: None,
        }
    }

    pub fn placed(mut self, start: i64, room: i64) -> Self {
        self.start = Some(start);
        self.room = Some(room);
        self
    }

    /// Both a start grain and a room are set.
    pub fn is_assigned(&self) -> bool {
        self.start.is_some() && self.room.is_some()
    }

    /// First grain after the meeting, if it has a start.
    pub fn end(&self) -> Option<i64> {
        self.start.map(|start| start + self.duration)
    }

    /// Grains occupied by the meeting, empty when it has no start.
    pub fn grains(&self) -> std::ops::Range<i64> {
        match self.start {
            Some(start) => start..start + self.duration,
            None => 0..0,
        }
    }

    /// Number of grains both meetings occupy.
    ///
    /// # Examples
    ///
    /// ```
    /// use deltascore_test::MeetingAssignment;
    ///
    /// let a = MeetingAssignment::new(0, 0, 4).placed(0, 1);
    /// let b = MeetingAssignment::new(1, 1, 4).placed(2, 1);
    /// assert_eq!(a.overlap(&b), 2);
    /// assert_eq!(a.overlap(&b.clone().placed(4, 1)), 0);
    /// ```
    pub fn overlap(&self, other: &MeetingAssignment) -> i64 {
        match (self.start, other.start) {
            (Some(a), Some(b)) => {
                let start = a.max(b);
                let end = (a + self.duration).min(b + other.duration);
                (end - start).max(0)
            }
            _ => 0,
        }
    }
}

/// A person's attendance at a meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendance {
    pub id: i64,
    pub person: i64,
    pub meeting: i64,
    /// Required attendees must not be double booked; preferred ones only
    /// take up a seat.
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: i64,
    pub capacity: i64,
}

/// Every fact class of the meeting scheduling model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingFact {
    Assignment(MeetingAssignment),
    Attendance(Attendance),
    Room(Room),
}

impl MeetingFact {
    /// # Panics
    /// Panics if the fact is not an assignment.
    pub fn assignment(&self) -> &MeetingAssignment {
        match self {
            MeetingFact::Assignment(a) => a,
            other => panic!("expected a meeting assignment, found {:?}", other),
        }
    }

    /// # Panics
    /// Panics if the fact is not an attendance.
    pub fn attendance(&self) -> &Attendance {
        match self {
            MeetingFact::Attendance(a) => a,
            other => panic!("expected an attendance, found {:?}", other),
        }
    }

    /// # Panics
    /// Panics if the fact is not a room.
    pub fn room(&self) -> &Room {
        match self {
            MeetingFact::Room(r) => r,
            other => panic!("expected a room, found {:?}", other),
        }
    }

    pub fn as_assignment_mut(&mut self) -> Option<&mut MeetingAssignment> {
        match self {
            MeetingFact::Assignment(a) => Some(a),
            _ => None,
        }
    }
}

impl Fact for MeetingFact {
    fn class_name(&self) -> &'static str {
        match self {
            MeetingFact::Assignment(_) => ASSIGNMENT,
            MeetingFact::Attendance(_) => ATTENDANCE,
            MeetingFact::Room(_) => ROOM,
        }
    }
}

impl From<MeetingAssignment> for MeetingFact {
    fn from(assignment: MeetingAssignment) -> Self {
        MeetingFact::Assignment(assignment)
    }
}

impl From<Attendance> for MeetingFact {
    fn from(attendance: Attendance) -> Self {
        MeetingFact::Attendance(attendance)
    }
}

impl From<Room> for MeetingFact {
    fn from(room: Room) -> Self {
        MeetingFact::Room(room)
    }
}
